//! `bing_search`: web search through the Bing Web Search v7 API.
//!
//! `GET {endpoint}?q=<query>&count=<n>` with the subscription key in the
//! `Ocp-Apim-Subscription-Key` header. Results come back as a JSON list of
//! `{title, url, snippet}`.

use async_trait::async_trait;
use readchat_config::SearchConfig;
use readchat_core::error::ToolError;
use readchat_core::tool::{Tool, ToolResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const BING_SEARCH_TOOL: &str = "bing_search";

/// Cheap to clone; the HTTP client is shared.
#[derive(Clone)]
pub struct BingSearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    count: u32,
}

impl BingSearchTool {
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>, count: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        if api_key.is_none() {
            warn!("BING_SUBSCRIPTION_KEY is not set, bing_search calls will fail");
        }
        Self {
            client,
            api_key,
            endpoint: endpoint.into(),
            count,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.api_key.clone(), &config.endpoint, config.count)
    }

    fn failed(reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: BING_SEARCH_TOOL.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for BingSearchTool {
    fn name(&self) -> &str {
        BING_SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Search the web with Bing. Useful for questions about current events or books \
         that are not in the user's reading history. Input should be a search query."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Self::failed("BING_SUBSCRIPTION_KEY is not set"))?;

        debug!(query = %query, count = self.count, "Searching Bing");
        let count = self.count.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| Self::failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::failed(format!("HTTP {status}: {body}")));
        }

        let body: BingResponse = response
            .json()
            .await
            .map_err(|e| Self::failed(format!("Failed to parse search response: {e}")))?;

        let results = body.into_results();
        let output = serde_json::to_string_pretty(&results).unwrap_or_default();

        Ok(ToolResult::new(output))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

// --- Bing API types (internal) ---

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages", default)]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingPage>,
}

#[derive(Debug, Deserialize)]
struct BingPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

impl BingResponse {
    fn into_results(self) -> Vec<SearchResult> {
        self.web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .into_iter()
            .map(|page| SearchResult {
                title: page.name,
                url: page.url,
                snippet: page.snippet,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bing_response() {
        let data = r#"{
            "_type": "SearchResponse",
            "webPages": {
                "totalEstimatedMatches": 2,
                "value": [
                    {"name": "Norwegian Wood - Wikipedia", "url": "https://en.wikipedia.org/wiki/Norwegian_Wood_(novel)", "snippet": "Norwegian Wood is a 1987 novel by Haruki Murakami."},
                    {"name": "Murakami bibliography", "url": "https://example.org/murakami"}
                ]
            }
        }"#;
        let parsed: BingResponse = serde_json::from_str(data).unwrap();
        let results = parsed.into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Norwegian Wood - Wikipedia");
        assert!(results[0].snippet.contains("1987"));
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn response_without_web_pages_is_empty() {
        let parsed: BingResponse = serde_json::from_str(r#"{"_type": "SearchResponse"}"#).unwrap();
        assert!(parsed.into_results().is_empty());
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let tool = BingSearchTool::new(None, "http://127.0.0.1:9/unused", 3);
        let err = tool
            .execute(serde_json::json!({"query": "murakami"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("BING_SUBSCRIPTION_KEY"));
    }

    #[tokio::test]
    async fn missing_query_is_invalid() {
        let tool = BingSearchTool::new(Some("k".into()), "http://127.0.0.1:9/unused", 3);
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn tool_definition() {
        let tool = BingSearchTool::from_config(&SearchConfig::default());
        let def = tool.to_definition();
        assert_eq!(def.name, "bing_search");
        assert_eq!(def.parameters["required"][0], "query");
    }
}
