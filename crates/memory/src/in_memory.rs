//! In-process history: lives as long as the server does.

use async_trait::async_trait;
use readchat_core::error::MemoryError;
use readchat_core::memory::ChatHistory;
use readchat_core::message::{Message, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-session message lists held in a map.
pub struct InMemoryHistory {
    sessions: Arc<RwLock<HashMap<SessionId, Vec<Message>>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatHistory for InMemoryHistory {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load(&self, session: &SessionId) -> Result<Vec<Message>, MemoryError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, session: &SessionId, messages: Vec<Message>) -> Result<(), MemoryError> {
        self.sessions
            .write()
            .await
            .entry(session.clone())
            .or_default()
            .extend(messages);
        Ok(())
    }

    async fn clear(&self, session: &SessionId) -> Result<(), MemoryError> {
        self.sessions.write().await.remove(session);
        Ok(())
    }
}
