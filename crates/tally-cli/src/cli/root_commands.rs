use clap::{Args, Subcommand};

use crate::cli::subcommands::BookCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Books (audited).
    Book {
        #[command(subcommand)]
        action: BookCommands,
    },
    /// Print JSON Schemas of audit documents.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Schema name; lists available names when omitted.
    pub name: Option<String>,
}
