//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the REST API. ChatService is generic over the backend client; AppState
//! pins it to the HTTP implementation from steward-infra.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use steward_core::chat::ChatService;
use steward_core::memory::SessionMemory;
use steward_infra::backend::HttpBackendClient;
use steward_types::config::RouterConfig;

pub type ConcreteChatService = ChatService<HttpBackendClient>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub memory: Arc<SessionMemory>,
    pub config: Arc<RouterConfig>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build the backend client and the process-wide session memory.
    pub fn init(config: RouterConfig) -> anyhow::Result<Self> {
        let backend = HttpBackendClient::new(&config.backend)?;
        let memory = Arc::new(SessionMemory::new(config.memory.clone()));
        let chat_service = Arc::new(ChatService::new(
            backend,
            Arc::clone(&memory),
            config.confirm_deletes,
        ));

        tracing::debug!(backend = %config.backend.base_url, "Application state initialized");

        Ok(Self {
            chat_service,
            memory,
            config: Arc::new(config),
            started_at: Utc::now(),
        })
    }
}
