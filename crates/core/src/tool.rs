//! Callables the model may invoke while answering a question.

use crate::error::ToolError;
use crate::message::MessageToolCall;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// One invocation requested by the model, with its arguments decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Echoed back on the tool message so the model can pair them up
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl From<&MessageToolCall> for ToolCall {
    /// Arguments that are not valid JSON decode to `null`; the tool then
    /// rejects them as invalid.
    fn from(raw: &MessageToolCall) -> Self {
        Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            arguments: serde_json::from_str(&raw.arguments).unwrap_or_default(),
        }
    }
}

/// Text a tool hands back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub output: String,
}

impl ToolResult {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            output: output.into(),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool, e.g. `book_history`.
    fn name(&self) -> &str;

    /// Shown to the model to help it choose between tools.
    fn description(&self) -> &str;

    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().into(),
            description: self.description().into(),
            parameters: self.parameters_schema(),
        }
    }
}

/// The tools offered for one question, ordered by name so every request
/// lists them the same way.
#[derive(Default)]
pub struct ToolRegistry {
    by_name: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tool`, replacing one already registered under the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.by_name.insert(tool.name().to_owned(), tool);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.by_name.values().map(|tool| tool.to_definition()).collect()
    }

    /// Run `call` against the tool it names.
    ///
    /// An unregistered name is `ToolError::NotFound`. The result carries
    /// the call's id.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let Some(tool) = self.by_name.get(&call.name) else {
            return Err(ToolError::NotFound(call.name.clone()));
        };
        let result = tool.execute(call.arguments.clone()).await?;
        Ok(ToolResult {
            call_id: call.id.clone(),
            ..result
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<Box<dyn Tool>> for ToolRegistry {
    fn from_iter<I: IntoIterator<Item = Box<dyn Tool>>>(tools: I) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }
}
