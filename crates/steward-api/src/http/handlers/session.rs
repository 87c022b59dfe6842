//! Session administration handlers.
//!
//! Endpoints:
//! - GET    /sessions                 - List active session ids
//! - GET    /sessions/{id}/history    - Conversation history (`?limit=N`)
//! - GET    /sessions/{id}/entities   - Tracked entities (`?kind=clients&limit=N`)
//! - GET    /sessions/{id}/summary    - Everything remembered for a session
//! - DELETE /sessions/{id}            - Drop a session
//! - POST   /sessions/{id}/clear      - Empty history but keep the session
//! - POST   /sessions/{id}/import     - Rebuild memory from a stored transcript

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use steward_types::error::SessionError;
use steward_types::intent::EntityKind;
use steward_types::session::{Interaction, SessionSummary, TrackedEntity};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntityQuery {
    /// Entity kind, plural or singular (`clients`, `campaign`). Defaults to clients.
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SessionList {
    pub sessions: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct EntityList {
    pub kind: EntityKind,
    pub entities: Vec<TrackedEntity>,
}

/// Result of a delete or clear.
#[derive(Debug, Serialize)]
pub struct SessionAction {
    pub session_id: String,
    pub action: &'static str,
}

fn require_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    if state.memory.contains(session_id) {
        Ok(())
    } else {
        Err(SessionError::NotFound.into())
    }
}

fn positive(limit: Option<usize>) -> Result<Option<usize>, AppError> {
    match limit {
        Some(0) => Err(AppError::Validation("limit must be positive".to_string())),
        other => Ok(other),
    }
}

/// GET /sessions - List active session ids.
pub async fn list_sessions(State(state): State<AppState>) -> Json<ApiResponse<SessionList>> {
    let clock = RequestClock::start();
    let sessions = state.memory.session_ids();
    let count = sessions.len();
    Json(clock.success(SessionList { sessions, count }).with_link("self", "/sessions"))
}

/// GET /sessions/{id}/history - Conversation history, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<Interaction>>>, AppError> {
    let clock = RequestClock::start();
    require_session(&state, &session_id)?;
    let limit = positive(query.limit)?;

    let history = state.memory.history(&session_id, limit);
    Ok(Json(
        clock
            .success(history)
            .with_link("summary", &format!("/sessions/{session_id}/summary")),
    ))
}

/// GET /sessions/{id}/entities - Recently mentioned entities, newest first.
pub async fn get_entities(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<EntityQuery>,
) -> Result<Json<ApiResponse<EntityList>>, AppError> {
    let clock = RequestClock::start();
    require_session(&state, &session_id)?;
    let limit = positive(query.limit)?;
    let kind = match query.kind.as_deref() {
        Some(kind) => kind.parse::<EntityKind>().map_err(AppError::Validation)?,
        None => EntityKind::Client,
    };

    let entities = state.memory.recent_entities(&session_id, kind, limit);
    Ok(Json(clock.success(EntityList { kind, entities })))
}

/// GET /sessions/{id}/summary - History, tracked entities and pending action.
pub async fn get_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let clock = RequestClock::start();
    let summary = state
        .memory
        .summary(&session_id)
        .ok_or(AppError::Session(SessionError::NotFound))?;
    Ok(Json(clock.success(summary)))
}

/// DELETE /sessions/{id} - Drop a session and its turn lock.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionAction>>, AppError> {
    let clock = RequestClock::start();
    if !state.chat_service.remove_session(&session_id).await {
        return Err(SessionError::NotFound.into());
    }
    tracing::info!(session_id = %session_id, "Session deleted");
    Ok(Json(clock.success(SessionAction {
        session_id,
        action: "deleted",
    })))
}

/// POST /sessions/{id}/clear - Empty the session but keep its entry.
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionAction>>, AppError> {
    let clock = RequestClock::start();
    if !state.chat_service.clear_session(&session_id).await {
        return Err(SessionError::NotFound.into());
    }
    tracing::info!(session_id = %session_id, "Session cleared");
    Ok(Json(clock.success(SessionAction {
        session_id,
        action: "cleared",
    })))
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub session_id: String,
    pub retained: usize,
}

/// POST /sessions/{id}/import - Replace a session's memory with a transcript.
pub async fn import_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(interactions): Json<Vec<Interaction>>,
) -> Result<Json<ApiResponse<ImportResult>>, AppError> {
    let clock = RequestClock::start();
    if interactions.is_empty() {
        return Err(AppError::Validation("transcript is empty".to_string()));
    }
    let retained = state
        .chat_service
        .import_transcript(&session_id, interactions)
        .await;
    tracing::info!(session_id = %session_id, retained, "Transcript imported");
    Ok(Json(clock.success(ImportResult {
        session_id,
        retained,
    })))
}
