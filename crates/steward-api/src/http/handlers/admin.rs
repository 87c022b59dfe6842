//! Maintenance and health endpoints.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PurgeResult {
    pub purged: usize,
    pub remaining: usize,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
    pub uptime_secs: i64,
    pub timestamp: String,
}

/// POST /admin/purge - Run an expiry sweep now.
pub async fn purge(State(state): State<AppState>) -> Json<ApiResponse<PurgeResult>> {
    let clock = RequestClock::start();
    let purged = state.chat_service.purge_expired();
    Json(clock.success(PurgeResult {
        purged,
        remaining: state.memory.session_count(),
    }))
}

/// GET /health - Liveness plus a session count.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let now = chrono::Utc::now();
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: state.memory.session_count(),
        uptime_secs: (now - state.started_at).num_seconds(),
        timestamp: now.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_types::session::Role;

    use crate::http::handlers::test_support;

    #[tokio::test]
    async fn test_purge_drops_empty_sessions() {
        let state = test_support::state();
        state.memory.append("live", Role::User, "hello");
        state.memory.append("empty", Role::User, "hello");
        state.memory.clear("empty");

        let Json(resp) = purge(State(state.clone())).await;
        let result = resp.data.unwrap();
        assert_eq!(result.purged, 1);
        assert_eq!(result.remaining, 1);
        assert!(state.memory.contains("live"));
    }

    #[tokio::test]
    async fn test_health_reports_sessions() {
        let state = test_support::state();
        state.memory.append("a", Role::User, "hi");
        let Json(health) = health(State(state)).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.active_sessions, 1);
        assert!(health.uptime_secs >= 0);
    }
}
