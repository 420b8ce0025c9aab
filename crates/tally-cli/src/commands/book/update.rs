use anyhow::Context;
use tally_core::entities::Book;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

use super::{book_key, commit_report};

pub async fn run(
    id: i64,
    title: Option<&str>,
    author: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if title.is_none() && author.is_none() {
        anyhow::bail!("At least one of --title or --author must be provided");
    }

    let mut uow = ctx.service.unit_of_work();
    let mut book = uow
        .load::<Book>(&book_key(id))
        .await?
        .with_context(|| format!("book {id} not found"))?;

    if let Some(title) = title {
        book.title = title.to_string();
    }
    if let Some(author) = author {
        book.author = author.to_string();
    }

    uow.update(&book)?;
    let outcome = uow
        .commit_with_retry(&ctx.identity, ctx.service.retry())
        .await?;

    output(&commit_report(&book, &outcome), flags.format)
}
