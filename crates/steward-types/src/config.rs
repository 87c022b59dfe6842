//! Configuration types for Steward.
//!
//! `RouterConfig` represents the top-level `config.toml` that controls the
//! backend location, session memory limits, and the HTTP server. All fields
//! have sensible defaults so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the command router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Backend CRUD API settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Session memory limits.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Ask before executing delete commands.
    #[serde(default = "default_confirm_deletes")]
    pub confirm_deletes: bool,
}

fn default_confirm_deletes() -> bool {
    true
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            memory: MemoryConfig::default(),
            server: ServerConfig::default(),
            confirm_deletes: default_confirm_deletes(),
        }
    }
}

/// Where the backend CRUD service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Bounds on volatile per-session memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum interactions kept per session (oldest dropped first).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Inactivity TTL, measured from the last interaction.
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,

    /// Default number of entities returned by recent-entity lookups.
    #[serde(default = "default_recent_entity_limit")]
    pub recent_entity_limit: usize,

    /// How often the server sweeps expired sessions.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

fn default_history_limit() -> usize {
    50
}

fn default_session_ttl_minutes() -> i64 {
    60
}

fn default_recent_entity_limit() -> usize {
    5
}

fn default_purge_interval_secs() -> u64 {
    300
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            session_ttl_minutes: default_session_ttl_minutes(),
            recent_entity_limit: default_recent_entity_limit(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_config_default_values() {
        let config = RouterConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:3001/api");
        assert_eq!(config.memory.history_limit, 50);
        assert_eq!(config.memory.session_ttl_minutes, 60);
        assert_eq!(config.memory.recent_entity_limit, 5);
        assert_eq!(config.server.port, 8000);
        assert!(config.confirm_deletes);
    }

    #[test]
    fn test_router_config_deserialize_empty() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.memory, MemoryConfig::default());
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn test_router_config_deserialize_partial() {
        let toml_str = r#"
confirm_deletes = false

[backend]
base_url = "http://crm.internal/api"

[memory]
history_limit = 20
"#;
        let config: RouterConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.confirm_deletes);
        assert_eq!(config.backend.base_url, "http://crm.internal/api");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.memory.history_limit, 20);
        assert_eq!(config.memory.session_ttl_minutes, 60);
    }
}
