//! Conversation memory implementations for readchat.

pub mod cache;
pub mod in_memory;

pub use cache::CacheHistory;
pub use in_memory::InMemoryHistory;

use readchat_config::{MemoryBackendKind, MemoryConfig};
use readchat_core::ChatHistory;
use std::sync::Arc;

/// Build the history backend selected in the configuration.
pub fn build_from_config(config: &MemoryConfig) -> Arc<dyn ChatHistory> {
    match config.backend {
        MemoryBackendKind::InMemory => Arc::new(InMemoryHistory::new()),
        MemoryBackendKind::Cache => Arc::new(CacheHistory::new(
            config.resolved_cache_dir(),
            &config.cache_name,
            i64::try_from(config.ttl_hours)
                .ok()
                .and_then(chrono::Duration::try_hours)
                .unwrap_or(chrono::Duration::MAX),
        )),
    }
}
