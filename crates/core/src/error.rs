//! Error types for the readchat domain.
//!
//! Each bounded context (model calls, tools, memory, CSV ingest) has its
//! own `thiserror` enum; `Error` wraps them for callers that cross contexts.

use thiserror::Error;

/// The top-level error type for readchat operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// A question was asked before any reading history was uploaded.
    #[error("No reading history uploaded for session {session_id}")]
    NoBooks { session_id: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt history for session {session_id}: {reason}")]
    Corrupt { session_id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// A tool's own model call failed.
    #[error("Model call failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Failures while turning uploaded bytes into book records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("Upload is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("Malformed CSV at row {row}: {reason}")]
    Malformed { row: usize, reason: String },

    /// A data row is too narrow to read columns 0, 2, 4 and 6.
    #[error("Row {row} has {columns} columns, at least 7 are required")]
    ShortRow { row: usize, columns: usize },
}
