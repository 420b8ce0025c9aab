mod book;

pub use book::BookCommands;
