//! Prompt assembly for the `book_history` tool.

use crate::book::BookRecord;
use readchat_config::{DATA_PLACEHOLDER, PromptConfig, QUESTION_PLACEHOLDER};

/// A fixed text with `{user_question}` and `{data}` slots.
///
/// Substitution is a single left-to-right pass, so placeholder-looking text
/// inside the question or the records is copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fill in the question and the records (as a JSON array).
    ///
    /// Nothing is escaped or truncated.
    pub fn render(&self, question: &str, records: &[BookRecord]) -> String {
        let data = serde_json::to_string_pretty(records).unwrap_or_default();
        let mut out = String::with_capacity(self.text.len() + question.len() + data.len());
        let mut rest = self.text.as_str();

        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix(QUESTION_PLACEHOLDER) {
                out.push_str(question);
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix(DATA_PLACEHOLDER) {
                out.push_str(&data);
                rest = tail;
            } else {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    out.push(c);
                }
                rest = chars.as_str();
            }
        }
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::from(&PromptConfig::default())
    }
}

impl From<&PromptConfig> for PromptTemplate {
    fn from(config: &PromptConfig) -> Self {
        Self::new(config.template.clone())
    }
}
