mod add;
mod delete;
mod update;

use serde_json::json;
use tally_core::entity::KeyValue;
use tally_db::CommitOutcome;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::BookCommands;
use crate::context::AppContext;

/// Handle `tly book`.
pub async fn handle(
    action: &BookCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        BookCommands::Add { id, title, author } => add::run(*id, title, author, ctx, flags).await,
        BookCommands::Update { id, title, author } => {
            update::run(*id, title.as_deref(), author.as_deref(), ctx, flags).await
        }
        BookCommands::Delete { id } => delete::run(*id, ctx, flags).await,
    }
}

fn book_key(id: i64) -> KeyValue {
    KeyValue::new(vec![json!(id)])
}

/// Response body shared by every book command.
fn commit_report<T: serde::Serialize>(book: &T, outcome: &CommitOutcome) -> serde_json::Value {
    json!({
        "book": book,
        "written": outcome.written,
        "attempts": outcome.attempts,
        "audit_entries": outcome.audit_entries,
    })
}
