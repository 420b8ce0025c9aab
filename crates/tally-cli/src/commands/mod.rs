pub mod book;
pub mod schema;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Book { action } => book::handle(&action, ctx, flags).await,
        Commands::Schema(args) => schema::handle(&args, flags),
    }
}
