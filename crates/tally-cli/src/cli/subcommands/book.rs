use clap::Subcommand;

/// Book commands. Each runs one unit of work.
#[derive(Clone, Debug, Subcommand)]
pub enum BookCommands {
    /// Add a book.
    Add {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
    },
    /// Update a book's title and/or author.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Delete a book.
    Delete { id: i64 },
}
