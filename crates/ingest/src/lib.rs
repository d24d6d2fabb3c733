//! Reading-history ingestion for readchat.
//!
//! Turns an uploaded CSV into a handful of `BookRecord`s and renders them,
//! together with a question, into the text the `book_history` tool sends to
//! the model.

pub mod book;
pub mod prompt;
pub mod reader;

pub use book::{BookRecord, BookShelf};
pub use prompt::PromptTemplate;
pub use reader::{MAX_BOOK_RECORDS, ingest_csv};
