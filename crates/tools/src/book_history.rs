//! `book_history`: answers a question from the uploaded reading history.
//!
//! Renders the shelf's prompt for the question and makes a single model
//! call without tools; the model's text is the tool output. A failed model
//! call is returned as [`ToolError::Provider`] and is not retried.

use async_trait::async_trait;
use readchat_core::error::ToolError;
use readchat_core::message::Message;
use readchat_core::provider::{Provider, ProviderRequest};
use readchat_core::tool::{Tool, ToolResult};
use readchat_ingest::BookShelf;
use std::sync::Arc;
use tracing::debug;

pub const BOOK_HISTORY_TOOL: &str = "book_history";

pub struct BookHistoryTool {
    shelf: Arc<BookShelf>,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    description: String,
}

impl BookHistoryTool {
    pub fn new(
        shelf: Arc<BookShelf>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            shelf,
            provider,
            model: model.into(),
            temperature,
            description: description.into(),
        }
    }
}

#[async_trait]
impl Tool for BookHistoryTool {
    fn name(&self) -> &str {
        BOOK_HISTORY_TOOL
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_question": {
                    "type": "string",
                    "description": "The user's question about the books they have read"
                }
            },
            "required": ["user_question"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let question = arguments["user_question"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'user_question' argument".into())
        })?;

        let prompt = self.shelf.prompt_for(question);
        debug!(
            books = self.shelf.len(),
            prompt_len = prompt.len(),
            "Asking model about reading history"
        );

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: self.temperature,
            max_tokens: None,
            tools: vec![],
        };

        let response = self.provider.complete(request).await?;

        Ok(ToolResult::new(response.message.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readchat_core::error::ProviderError;
    use readchat_core::provider::ProviderResponse;
    use readchat_ingest::{BookRecord, PromptTemplate};
    use std::sync::Mutex;

    /// Records every request and answers with a fixed text.
    struct RecordingProvider {
        seen: Mutex<Vec<ProviderRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            if self.fail {
                return Err(ProviderError::Network("connection reset".into()));
            }
            Ok(ProviderResponse {
                message: Message::assistant("You finished Kafka on the Shore."),
                usage: None,
                model: "mock".into(),
            })
        }
    }

    fn shelf() -> Arc<BookShelf> {
        Arc::new(BookShelf::new(
            vec![BookRecord {
                title: "Kafka on the Shore".into(),
                author: "Haruki Murakami".into(),
                publisher: "Vintage".into(),
                completed_date: "2024-04-02".into(),
            }],
            PromptTemplate::new("{user_question}\n{data}"),
        ))
    }

    fn tool(provider: Arc<RecordingProvider>) -> BookHistoryTool {
        BookHistoryTool::new(shelf(), provider, "gpt-3.5-turbo", 0.0, "reading history")
    }

    #[tokio::test]
    async fn sends_rendered_prompt_without_tools() {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(vec![]),
            fail: false,
        });
        let result = tool(provider.clone())
            .execute(serde_json::json!({"user_question": "What did I read in April?"}))
            .await
            .unwrap();

        assert_eq!(result.output, "You finished Kafka on the Shore.");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].tools.is_empty());
        let prompt = &seen[0].messages[0].content;
        assert!(prompt.starts_with("What did I read in April?\n"));
        assert!(prompt.contains("Haruki Murakami"));
    }

    #[tokio::test]
    async fn missing_question_is_invalid() {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(vec![]),
            fail: false,
        });
        let err = tool(provider.clone())
            .execute(serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_passed_through() {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(vec![]),
            fail: true,
        });
        let err = tool(provider)
            .execute(serde_json::json!({"user_question": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Provider(ProviderError::Network(_))));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn definition_uses_configured_description() {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(vec![]),
            fail: false,
        });
        let def = tool(provider).to_definition();
        assert_eq!(def.name, "book_history");
        assert_eq!(def.description, "reading history");
    }
}
