use tally_core::entities::Book;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

use super::commit_report;

pub async fn run(
    id: i64,
    title: &str,
    author: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let book = Book::new(id, title, author);

    let mut uow = ctx.service.unit_of_work();
    uow.add(&book)?;
    let outcome = uow
        .commit_with_retry(&ctx.identity, ctx.service.retry())
        .await?;

    output(&commit_report(&book, &outcome), flags.format)
}
