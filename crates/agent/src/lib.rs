//! The readchat agent.
//!
//! [`AgentLoop`] is the orchestrator: it hands the question, the session's
//! memory and the tool definitions to the model, runs whatever tools the
//! model asks for, and loops until the model answers in text.
//!
//! [`ReadingAssistant`] sits in front of it and owns the rules around a
//! question: empty questions are skipped, nothing is asked before a CSV has
//! been uploaded, and each question gets a fresh tool registry built from
//! the session's books.

pub mod assistant;
pub mod loop_runner;

pub use assistant::{AssistantSettings, ReadingAssistant, SessionContext};
pub use loop_runner::AgentLoop;
