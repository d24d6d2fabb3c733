//! TTL cache history: conversation memory that outlives the process.
//!
//! Each session is one JSON document at `{dir}/{cache_name}/{session}.json`:
//!
//! ```json
//! { "expires_at": "2026-01-01T12:00:00Z", "messages": [ ... ] }
//! ```
//!
//! Every write pushes `expires_at` to `now + ttl`. A document past its
//! expiry reads as empty and is removed on the next access.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use readchat_core::error::MemoryError;
use readchat_core::memory::ChatHistory;
use readchat_core::message::{Message, SessionId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct CacheHistory {
    root: PathBuf,
    ttl: Duration,
    /// Serializes read-modify-write cycles on the documents.
    write_lock: Mutex<()>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument {
    expires_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl CacheHistory {
    pub fn new(dir: impl AsRef<Path>, cache_name: &str, ttl: Duration) -> Self {
        let root = dir.as_ref().join(sanitize(cache_name));
        debug!(path = %root.display(), ttl_secs = ttl.num_seconds(), "Cache history configured");
        Self {
            root,
            ttl,
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, session: &SessionId) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(session.as_str())))
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Read a live document, deleting it if it has expired.
    async fn read_live(&self, session: &SessionId) -> Result<Vec<Message>, MemoryError> {
        let path = self.path_for(session);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(MemoryError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let doc: CacheDocument =
            serde_json::from_str(&raw).map_err(|e| MemoryError::Corrupt {
                session_id: session.to_string(),
                reason: e.to_string(),
            })?;

        if doc.expires_at <= Utc::now() {
            debug!(session = %session, "Cached history expired");
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove expired history");
            }
            return Ok(Vec::new());
        }

        Ok(doc.messages)
    }

    async fn write(&self, session: &SessionId, messages: Vec<Message>) -> Result<(), MemoryError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            MemoryError::Storage(format!("Failed to create cache directory: {e}"))
        })?;

        let doc = CacheDocument {
            expires_at: self.expiry_from(Utc::now()),
            messages,
        };
        let body = serde_json::to_vec(&doc)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize history: {e}")))?;

        let path = self.path_for(session);
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to write {}: {e}", path.display())))
    }
}

#[async_trait]
impl ChatHistory for CacheHistory {
    fn name(&self) -> &str {
        "cache"
    }

    async fn load(&self, session: &SessionId) -> Result<Vec<Message>, MemoryError> {
        let _guard = self.write_lock.lock().await;
        self.read_live(session).await
    }

    async fn append(&self, session: &SessionId, messages: Vec<Message>) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read_live(session).await?;
        stored.extend(messages);
        self.write(session, stored).await
    }

    async fn clear(&self, session: &SessionId) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.path_for(session)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MemoryError::Storage(format!("Failed to clear history: {e}"))),
        }
    }
}

/// Keep keys usable as file names: anything outside `[A-Za-z0-9_-]` becomes `_`.
fn sanitize(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".into()
    } else {
        cleaned
    }
}
