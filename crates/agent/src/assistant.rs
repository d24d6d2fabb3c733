//! Session state and the question-answering facade.

use crate::loop_runner::AgentLoop;
use readchat_config::AppConfig;
use readchat_core::agent::Orchestrator;
use readchat_core::error::Error;
use readchat_core::memory::ChatHistory;
use readchat_core::message::SessionId;
use readchat_core::provider::Provider;
use readchat_core::tool::ToolRegistry;
use readchat_ingest::{BookShelf, PromptTemplate, ingest_csv};
use readchat_tools::{BingSearchTool, BookHistoryTool, session_registry};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything known about one user session.
///
/// Replaces a process-wide session id: whoever drives the UI creates one
/// of these and passes it to every call.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub id: SessionId,
    shelf: Option<Arc<BookShelf>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: SessionId) -> Self {
        Self { id, shelf: None }
    }

    /// The books of the latest upload, if any.
    pub fn shelf(&self) -> Option<&Arc<BookShelf>> {
        self.shelf.as_ref()
    }
}

/// How the `book_history` tool talks to the model.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub model: String,
    pub temperature: f32,
    pub template: PromptTemplate,
    pub tool_description: String,
}

impl From<&AppConfig> for AssistantSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            template: PromptTemplate::from(&config.prompt),
            tool_description: config.prompt.tool_description.clone(),
        }
    }
}

pub struct ReadingAssistant {
    provider: Arc<dyn Provider>,
    orchestrator: Arc<dyn Orchestrator>,
    search: BingSearchTool,
    settings: AssistantSettings,
}

impl ReadingAssistant {
    pub fn new(
        provider: Arc<dyn Provider>,
        orchestrator: Arc<dyn Orchestrator>,
        search: BingSearchTool,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            provider,
            orchestrator,
            search,
            settings,
        }
    }

    /// Wire the agent loop, search tool and prompt settings from `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        history: Arc<dyn ChatHistory>,
    ) -> Self {
        let mut orchestrator = AgentLoop::new(
            provider.clone(),
            &config.model,
            config.temperature,
            &config.agent.system_prompt,
            history,
        )
        .with_max_iterations(config.agent.max_iterations);
        if let Some(max_tokens) = config.agent.max_tokens {
            orchestrator = orchestrator.with_max_tokens(max_tokens);
        }

        Self::new(
            provider,
            Arc::new(orchestrator),
            BingSearchTool::from_config(&config.search),
            AssistantSettings::from(config),
        )
    }

    /// Ingest an uploaded CSV into the session, replacing earlier books.
    ///
    /// On failure the session keeps whatever it had before.
    pub fn upload(&self, session: &mut SessionContext, bytes: &[u8]) -> Result<Arc<BookShelf>, Error> {
        let records = ingest_csv(bytes)?;
        let shelf = Arc::new(BookShelf::new(records, self.settings.template.clone()));
        info!(session = %session.id, books = shelf.len(), "Reading history uploaded");
        session.shelf = Some(shelf.clone());
        Ok(shelf)
    }

    /// The two tools offered for a question over `shelf`.
    pub fn registry_for(&self, shelf: Arc<BookShelf>) -> ToolRegistry {
        let book_history = BookHistoryTool::new(
            shelf,
            self.provider.clone(),
            &self.settings.model,
            self.settings.temperature,
            &self.settings.tool_description,
        );
        session_registry(book_history, self.search.clone())
    }

    /// Answer a question about the session's books.
    ///
    /// Returns `Ok(None)` without contacting the model when the question is
    /// the empty string, and `Error::NoBooks` when nothing has been uploaded
    /// yet. Whitespace-only questions are sent as typed.
    pub async fn ask(&self, session: &SessionContext, question: &str) -> Result<Option<String>, Error> {
        if question.is_empty() {
            debug!(session = %session.id, "Empty question skipped");
            return Ok(None);
        }

        let shelf = session.shelf().cloned().ok_or_else(|| Error::NoBooks {
            session_id: session.id.to_string(),
        })?;

        let tools = self.registry_for(shelf);
        let answer = self.orchestrator.decide(question, &tools, &session.id).await?;
        Ok(Some(answer))
    }
}
