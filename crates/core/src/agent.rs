//! Orchestrator trait: the narrow seam around the tool-choosing agent.
//!
//! Given a question, the tools available for it, and the session whose
//! memory to consult, an orchestrator returns the final answer text. How it
//! decides which tools to call is its own business.

use crate::error::Error;
use crate::message::SessionId;
use crate::tool::ToolRegistry;
use async_trait::async_trait;

#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn decide(
        &self,
        question: &str,
        tools: &ToolRegistry,
        session: &SessionId,
    ) -> std::result::Result<String, Error>;
}
