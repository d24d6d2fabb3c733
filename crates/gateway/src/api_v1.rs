//! HTTP API v1: sessions, uploads and questions.
//!
//! Endpoints:
//!
//! - `POST   /v1/sessions`: Create a session
//! - `DELETE /v1/sessions/{id}`: Drop a session and its memory
//! - `POST   /v1/sessions/{id}/books`: Upload a reading history CSV (raw body)
//! - `GET    /v1/sessions/{id}/books`: Books of the latest upload
//! - `POST   /v1/sessions/{id}/ask`: Ask a question about the books
//! - `GET    /v1/sessions/{id}/history`: Remembered questions and answers

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use readchat_agent::{ReadingAssistant, SessionContext};
use readchat_core::error::Error;
use readchat_core::memory::ChatHistory;
use readchat_core::message::{Role, SessionId};
use readchat_ingest::BookRecord;

// ── State ─────────────────────────────────────────────────────────────────

/// Maximum number of live sessions before the oldest is evicted.
const MAX_SESSIONS: usize = 1_000;

struct SessionEntry {
    context: SessionContext,
    /// Creation order, used to pick the eviction victim.
    seq: u64,
}

/// Shared state for the v1 API.
pub struct GatewayState {
    pub assistant: Arc<ReadingAssistant>,
    pub history: Arc<dyn ChatHistory>,
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    next_seq: AtomicU64,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(assistant: Arc<ReadingAssistant>, history: Arc<dyn ChatHistory>) -> Self {
        Self {
            assistant,
            history,
            sessions: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Register a fresh session and return its id.
    ///
    /// At capacity the oldest session is dropped along with its remembered
    /// conversation.
    pub async fn create_session(&self) -> SessionId {
        let context = SessionContext::new();
        let id = context.id.clone();

        let evicted = {
            let mut sessions = self.sessions.write().await;
            let evicted = if sessions.len() >= MAX_SESSIONS {
                sessions
                    .iter()
                    .min_by_key(|(_, entry)| entry.seq)
                    .map(|(k, _)| k.clone())
            } else {
                None
            };
            if let Some(oldest) = &evicted {
                sessions.remove(oldest);
            }
            sessions.insert(
                id.clone(),
                SessionEntry {
                    context,
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                },
            );
            evicted
        };

        if let Some(oldest) = evicted {
            info!(session = %oldest, "Session evicted");
            if let Err(e) = self.history.clear(&oldest).await {
                warn!(session = %oldest, error = %e, "Failed to clear evicted session memory");
            }
        }
        id
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            axum::routing::delete(delete_session_handler),
        )
        .route(
            "/sessions/{id}/books",
            post(upload_books_handler).get(list_books_handler),
        )
        .route("/sessions/{id}/ask", post(ask_handler))
        .route("/sessions/{id}/history", get(history_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Serialize)]
struct BooksResponse {
    count: usize,
    books: Vec<BookRecord>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: Option<String>,
    /// True when the question was empty and nothing was sent to the model.
    skipped: bool,
}

#[derive(Serialize)]
struct HistoryEntryDto {
    role: Role,
    content: String,
    timestamp: String,
}

#[derive(Serialize)]
struct HistoryResponse {
    session_id: String,
    messages: Vec<HistoryEntryDto>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Maps domain failures onto HTTP status codes.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unknown_session(id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("Unknown session: {id}"),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::Ingest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NoBooks { .. } => StatusCode::CONFLICT,
            Error::Provider(_) | Error::Tool(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %e, "Request failed");
        } else {
            warn!(error = %e, "Request rejected");
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn create_session_handler(
    State(state): State<SharedState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let id = state.create_session().await;
    info!(session = %id, "Session created");
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: id.to_string(),
        }),
    )
}

async fn delete_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId(id);
    let removed = state.sessions.write().await.remove(&id);
    if removed.is_none() {
        return Err(ApiError::unknown_session(id.as_str()));
    }
    state.history.clear(&id).await.map_err(Error::from)?;
    info!(session = %id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_books_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<BooksResponse>, ApiError> {
    let id = SessionId(id);
    let mut sessions = state.sessions.write().await;
    let entry = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::unknown_session(id.as_str()))?;

    let shelf = state.assistant.upload(&mut entry.context, &body)?;
    Ok(Json(BooksResponse {
        count: shelf.len(),
        books: shelf.records().to_vec(),
    }))
}

async fn list_books_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<BooksResponse>, ApiError> {
    let id = SessionId(id);
    let sessions = state.sessions.read().await;
    let entry = sessions
        .get(&id)
        .ok_or_else(|| ApiError::unknown_session(id.as_str()))?;

    let books = entry
        .context
        .shelf()
        .map(|shelf| shelf.records().to_vec())
        .unwrap_or_default();
    Ok(Json(BooksResponse {
        count: books.len(),
        books,
    }))
}

async fn ask_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let id = SessionId(id);
    // Snapshot the session so the lock is not held across model calls.
    let context = state
        .sessions
        .read()
        .await
        .get(&id)
        .map(|entry| entry.context.clone())
        .ok_or_else(|| ApiError::unknown_session(id.as_str()))?;

    info!(
        session = %id,
        question_len = payload.question.len(),
        "Question received"
    );

    let answer = state.assistant.ask(&context, &payload.question).await?;
    Ok(Json(AskResponse {
        skipped: answer.is_none(),
        answer,
    }))
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let id = SessionId(id);
    if !state.sessions.read().await.contains_key(&id) {
        return Err(ApiError::unknown_session(id.as_str()));
    }

    let messages = state.history.load(&id).await.map_err(Error::from)?;
    Ok(Json(HistoryResponse {
        session_id: id.to_string(),
        messages: messages
            .into_iter()
            .map(|m| HistoryEntryDto {
                role: m.role,
                content: m.content,
                timestamp: m.timestamp.to_rfc3339(),
            })
            .collect(),
    }))
}
