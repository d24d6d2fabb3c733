//! The tool-calling loop.

use async_trait::async_trait;
use readchat_core::agent::Orchestrator;
use readchat_core::error::{Error, ToolError};
use readchat_core::memory::ChatHistory;
use readchat_core::message::{Message, SessionId};
use readchat_core::provider::{Provider, ProviderRequest};
use readchat_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Returned when the model keeps calling tools past the iteration cap.
pub const MAX_ITERATIONS_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

/// Model round-trips allowed per question unless configured otherwise.
pub const DEFAULT_MAX_ITERATIONS: u32 = 15;

/// Orchestrates LLM calls and tool execution for one question at a time.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,

    model: String,

    temperature: f32,

    max_tokens: Option<u32>,

    system_prompt: String,

    /// Maximum model round-trips per question
    max_iterations: u32,

    history: Arc<dyn ChatHistory>,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        system_prompt: impl Into<String>,
        history: Arc<dyn ChatHistory>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            system_prompt: system_prompt.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            history,
        }
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Run each requested tool and append its output as a tool message.
    ///
    /// A call naming a tool that is not offered is answered with an error
    /// message so the model can pick another one. Any other tool failure
    /// ends the question with that error; a failed model call inside a tool
    /// surfaces as `Error::Provider`.
    async fn run_tools(
        &self,
        calls: &[ToolCall],
        tools: &ToolRegistry,
        messages: &mut Vec<Message>,
    ) -> Result<(), Error> {
        for call in calls {
            let start = std::time::Instant::now();
            let result = tools.execute(call).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(tool_result) => {
                    debug!(
                        tool = %call.name,
                        duration_ms,
                        output_len = tool_result.output.len(),
                        "Tool executed"
                    );
                    messages.push(Message::tool_result(&call.id, tool_result.output));
                }
                Err(e @ ToolError::NotFound(_)) => {
                    warn!(tool = %call.name, "Model asked for an unknown tool");
                    messages.push(Message::tool_result(&call.id, format!("Error: {e}")));
                }
                Err(ToolError::Provider(e)) => {
                    warn!(tool = %call.name, duration_ms, error = %e, "Tool model call failed");
                    return Err(Error::Provider(e));
                }
                Err(e) => {
                    warn!(tool = %call.name, duration_ms, error = %e, "Tool execution failed");
                    return Err(Error::Tool(e));
                }
            }
        }
        Ok(())
    }

    async fn remember(&self, session: &SessionId, question: &str, answer: &str) -> Result<(), Error> {
        self.history
            .append(
                session,
                vec![Message::user(question), Message::assistant(answer)],
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Orchestrator for AgentLoop {
    /// Answer `question` for `session`, offering the model `tools`.
    ///
    /// Only the question and the final answer are written to memory; tool
    /// traffic stays local to this call. Nothing is remembered when the
    /// question fails.
    async fn decide(
        &self,
        question: &str,
        tools: &ToolRegistry,
        session: &SessionId,
    ) -> Result<String, Error> {
        let past = self.history.load(session).await?;
        info!(
            session = %session,
            history = past.len(),
            tools = ?tools.names(),
            "Processing question"
        );

        let mut messages = Vec::with_capacity(past.len() + 2);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(past);
        messages.push(Message::user(question));

        let tool_definitions = tools.definitions();

        for iteration in 1..=self.max_iterations {
            debug!(session = %session, iteration, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.provider.complete(request).await?;

            if let Some(usage) = &response.usage {
                debug!(
                    model = %response.model,
                    total_tokens = usage.total_tokens,
                    "Model responded"
                );
            }

            if response.message.tool_calls.is_empty() {
                let answer = response.message.content;
                self.remember(session, question, &answer).await?;
                return Ok(answer);
            }

            let calls: Vec<ToolCall> = response.message.tool_calls.iter().map(ToolCall::from).collect();
            debug!(tool_count = calls.len(), "Executing tool calls");

            messages.push(response.message);
            self.run_tools(&calls, tools, &mut messages).await?;
        }

        warn!(
            session = %session,
            iterations = self.max_iterations,
            "Max tool iterations reached"
        );
        self.remember(session, question, MAX_ITERATIONS_MESSAGE).await?;
        Ok(MAX_ITERATIONS_MESSAGE.into())
    }
}
