use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `tly` binary.
#[derive(Debug, Parser)]
#[command(name = "tly", version, about = "Tally - audited units of work")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Acting user recorded on audit entries (defaults to $USER)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Correlation id for this operation (generated when omitted)
    #[arg(long, global = true)]
    pub correlation_id: Option<String>,

    /// Database file (overrides database.path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            user: self.user.clone(),
            correlation_id: self.correlation_id.clone(),
            db: self.db.clone(),
        }
    }
}
