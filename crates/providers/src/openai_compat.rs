//! Chat completions over the OpenAI wire format.
//!
//! Works against api.openai.com and any server exposing the same
//! `POST {base_url}/chat/completions` route with function calling.

use async_trait::async_trait;
use readchat_core::error::ProviderError;
use readchat_core::message::{Message, MessageToolCall, Role};
use readchat_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
use reqwest::{StatusCode, header::RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        let base_url: String = base_url.into();

        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            client,
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", OPENAI_BASE_URL, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Map a non-success status onto the provider error the caller sees.
fn status_error(status: StatusCode, retry_after: Option<u64>, body: String) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::AuthenticationFailed(format!("HTTP {}", status.as_u16()))
        }
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Requesting chat completion"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&ChatRequest::from(&request))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Chat completion rejected");
            return Err(status_error(status, retry_after, body));
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: status.as_u16(),
            message: format!("Unreadable completion: {e}"),
        })?;
        completion.try_into()
    }
}

// Wire format. Requests borrow from the domain types; responses are owned.

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

impl<'a> From<&'a ProviderRequest> for ChatRequest<'a> {
    fn from(request: &'a ProviderRequest) -> Self {
        Self {
            model: &request.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: request.temperature,
            stream: false,
            max_tokens: request.max_tokens,
            tools: request.tools.iter().map(WireTool::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a Role,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireCall<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: &message.role,
            content: &message.content,
            tool_calls: message.tool_calls.iter().map(WireCall::from).collect(),
            tool_call_id: message.tool_call_id.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct WireCall<'a> {
    id: &'a str,
    r#type: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    arguments: &'a str,
}

impl<'a> From<&'a MessageToolCall> for WireCall<'a> {
    fn from(call: &'a MessageToolCall) -> Self {
        Self {
            id: &call.id,
            r#type: "function",
            function: WireFunction {
                name: &call.name,
                arguments: &call.arguments,
            },
        }
    }
}

#[derive(Serialize)]
struct WireTool<'a> {
    r#type: &'static str,
    function: &'a ToolDefinition,
}

impl<'a> From<&'a ToolDefinition> for WireTool<'a> {
    fn from(definition: &'a ToolDefinition) -> Self {
        Self {
            r#type: "function",
            function: definition,
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ReplyCall>,
}

#[derive(Deserialize)]
struct ReplyCall {
    id: String,
    function: ReplyFunction,
}

#[derive(Deserialize)]
struct ReplyFunction {
    name: String,
    arguments: String,
}

impl TryFrom<ChatCompletion> for ProviderResponse {
    type Error = ProviderError;

    /// Only the first choice is used; a completion without one is an error.
    fn try_from(completion: ChatCompletion) -> Result<Self, Self::Error> {
        let Some(choice) = completion.choices.into_iter().next() else {
            return Err(ProviderError::ApiError {
                status_code: StatusCode::OK.as_u16(),
                message: "Completion has no choices".into(),
            });
        };

        let mut message = Message::assistant(choice.message.content.unwrap_or_default());
        message.tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| MessageToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ProviderResponse {
            message,
            usage: completion.usage,
            model: completion.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(request: &ProviderRequest) -> serde_json::Value {
        serde_json::to_value(ChatRequest::from(request)).unwrap()
    }

    fn request(messages: Vec<Message>) -> ProviderRequest {
        ProviderRequest {
            model: "gpt-3.5-turbo".into(),
            messages,
            temperature: 0.0,
            max_tokens: None,
            tools: vec![],
        }
    }

    #[test]
    fn openai_defaults() {
        let provider = OpenAiCompatProvider::openai("sk-test");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider = OpenAiCompatProvider::new("local", "http://localhost:11434/v1/", "x");
        assert_eq!(provider.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn roles_are_lowercase_on_the_wire() {
        let body = wire(&request(vec![Message::system("Be brief"), Message::user("Hello")]));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert!(body["messages"][1].get("tool_calls").is_none());
    }

    #[test]
    fn assistant_tool_calls_and_tool_replies() {
        let mut asked = Message::assistant("");
        asked.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "book_history".into(),
            arguments: r#"{"user_question":"latest?"}"#.into(),
        }];
        let answered = Message::tool_result("call_1", "Dune");
        let body = wire(&request(vec![asked, answered]));

        let call = &body["messages"][0]["tool_calls"][0];
        assert_eq!(call["type"], "function");
        assert_eq!(call["function"]["name"], "book_history");
        assert_eq!(call["function"]["arguments"], r#"{"user_question":"latest?"}"#);
        assert_eq!(body["messages"][1]["role"], "tool");
        assert_eq!(body["messages"][1]["tool_call_id"], "call_1");
    }

    #[test]
    fn optional_fields_are_omitted() {
        let mut req = request(vec![Message::user("hi")]);
        let body = wire(&req);
        assert!(body.get("tools").is_none());
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["stream"], false);

        req.max_tokens = Some(64);
        req.tools.push(ToolDefinition {
            name: "bing_search".into(),
            description: "Search".into(),
            parameters: serde_json::json!({"type": "object"}),
        });
        let body = wire(&req);
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "bing_search");
    }

    #[test]
    fn tool_call_completion_is_read() {
        let data = r#"{
            "model": "gpt-3.5-turbo-0125",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "book_history", "arguments": "{\"user_question\":\"x\"}"}
                    }]
                }
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
        }"#;
        let completion: ChatCompletion = serde_json::from_str(data).unwrap();
        let response = ProviderResponse::try_from(completion).unwrap();
        assert_eq!(response.model, "gpt-3.5-turbo-0125");
        assert_eq!(response.message.role, Role::Assistant);
        assert_eq!(response.message.content, "");
        assert_eq!(response.message.tool_calls[0].id, "call_abc");
        assert_eq!(response.usage.unwrap().total_tokens, 19);
    }

    #[test]
    fn completion_without_choices_is_an_error() {
        let completion: ChatCompletion =
            serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        let err = ProviderResponse::try_from(completion).unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status_code: 200, .. }));
    }

    #[test]
    fn statuses_map_to_provider_errors() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some(30), String::new()),
            ProviderError::RateLimited { retry_after_secs: 30 }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, None, String::new()),
            ProviderError::RateLimited { retry_after_secs: 5 }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, None, String::new()),
            ProviderError::AuthenticationFailed(_)
        ));
        let err = status_error(StatusCode::BAD_GATEWAY, None, "upstream".into());
        assert!(matches!(err, ProviderError::ApiError { status_code: 502, .. }));
        assert!(err.to_string().contains("upstream"));
    }
}
