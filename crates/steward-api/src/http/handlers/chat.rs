//! Chat turn handler.
//!
//! POST /chat  `{"session_id": "...", "prompt": "..."}`
//!
//! The session id may come from the body or the `X-Session-ID` header; the
//! body wins when both are present. Without either a new session is started.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use steward_core::chat::ChatReply;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub prompt: String,
}

/// POST /chat - Run one conversational turn.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let clock = RequestClock::start();

    let session_id = body.session_id.or_else(|| {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });

    let reply = state.chat_service.handle(session_id, &body.prompt).await?;
    let link = format!("/sessions/{}/history", reply.session_id);

    Ok(Json(clock.success(reply).with_link("history", &link)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use steward_types::intent::Intent;

    use crate::http::handlers::test_support;

    fn request(session_id: Option<&str>, prompt: &str) -> Json<ChatRequest> {
        Json(ChatRequest {
            session_id: session_id.map(str::to_string),
            prompt: prompt.to_string(),
        })
    }

    #[tokio::test]
    async fn test_help_prompt_generates_session() {
        let state = test_support::state();
        let Json(resp) = chat(State(state.clone()), HeaderMap::new(), request(None, "help"))
            .await
            .unwrap();

        let reply = resp.data.unwrap();
        assert_eq!(reply.intent, Intent::Respond);
        assert!(reply.response.starts_with("### Available Commands"));
        assert!(state.memory.contains(&reply.session_id));
    }

    #[tokio::test]
    async fn test_header_session_id_is_honoured() {
        let state = test_support::state();
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));

        let Json(resp) = chat(State(state.clone()), headers.clone(), request(None, "help"))
            .await
            .unwrap();
        assert_eq!(resp.data.unwrap().session_id, "from-header");

        let Json(resp) = chat(State(state), headers, request(Some("from-body"), "help"))
            .await
            .unwrap();
        assert_eq!(resp.data.unwrap().session_id, "from-body");
    }

    #[tokio::test]
    async fn test_invalid_session_id_is_rejected() {
        let state = test_support::state();
        let long = "x".repeat(200);
        let err = chat(State(state), HeaderMap::new(), request(Some(&long), "help"))
            .await
            .unwrap_err();
        assert_eq!(err.code_and_message().0, "INVALID_SESSION_ID");
    }
}
