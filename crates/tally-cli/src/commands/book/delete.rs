use anyhow::Context;
use tally_core::entities::Book;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

use super::{book_key, commit_report};

pub async fn run(id: i64, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut uow = ctx.service.unit_of_work();
    let book = uow
        .load::<Book>(&book_key(id))
        .await?
        .with_context(|| format!("book {id} not found"))?;

    uow.remove(&book)?;
    let outcome = uow
        .commit_with_retry(&ctx.identity, ctx.service.retry())
        .await?;

    output(&commit_report(&book, &outcome), flags.format)
}
