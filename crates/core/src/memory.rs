//! ChatHistory trait: per-session conversation memory.
//!
//! The orchestrator loads the history before asking the model and appends
//! the new question and answer afterwards. Implementations: in-process
//! (lives as long as the server) and a TTL cache persisted on disk.

use crate::error::MemoryError;
use crate::message::{Message, SessionId};
use async_trait::async_trait;

#[async_trait]
pub trait ChatHistory: Send + Sync {
    /// The backend name (e.g., "in_memory", "cache").
    fn name(&self) -> &str;

    /// All messages stored for the session, oldest first.
    ///
    /// Unknown or expired sessions yield an empty list.
    async fn load(&self, session: &SessionId) -> std::result::Result<Vec<Message>, MemoryError>;

    /// Append messages to the end of the session's history.
    async fn append(
        &self,
        session: &SessionId,
        messages: Vec<Message>,
    ) -> std::result::Result<(), MemoryError>;

    /// Forget everything stored for the session.
    async fn clear(&self, session: &SessionId) -> std::result::Result<(), MemoryError>;
}
