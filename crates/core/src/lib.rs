//! # readchat core
//!
//! Domain types, traits, and error definitions shared by every readchat
//! crate. Implementations live in their own crates and depend inward on
//! this one:
//! - `Provider` is implemented by `readchat-providers`
//! - `Tool` is implemented by `readchat-tools`
//! - `ChatHistory` is implemented by `readchat-memory`
//! - `Orchestrator` is implemented by `readchat-agent`

pub mod agent;
pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::Orchestrator;
pub use error::{Error, Result};
pub use memory::ChatHistory;
pub use message::{Message, Role, SessionId};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
