//! Tools offered to the readchat agent.
//!
//! Every question gets exactly two tools: `book_history`, which asks the
//! model about the session's uploaded books, and `bing_search` for
//! anything the reading history cannot answer.

pub mod bing_search;
pub mod book_history;

pub use bing_search::BingSearchTool;
pub use book_history::BookHistoryTool;

use readchat_core::tool::{Tool, ToolRegistry};

/// Build the registry for one question.
pub fn session_registry(book_history: BookHistoryTool, search: BingSearchTool) -> ToolRegistry {
    [
        Box::new(book_history) as Box<dyn Tool>,
        Box::new(search) as Box<dyn Tool>,
    ]
    .into_iter()
    .collect()
}
