//! Configuration loader for Steward.
//!
//! Reads a `config.toml` (by default `~/.config/steward/config.toml`) and
//! deserializes it into [`RouterConfig`], then applies environment
//! overrides:
//!
//! - `STEWARD_BACKEND_URL` replaces `backend.base_url`
//! - `STEWARD_PORT` replaces `server.port`

use std::path::{Path, PathBuf};

use steward_types::config::RouterConfig;
use steward_types::error::ConfigError;

pub const BACKEND_URL_ENV: &str = "STEWARD_BACKEND_URL";
pub const PORT_ENV: &str = "STEWARD_PORT";

/// `{config_dir}/steward/config.toml`, or `./config.toml` when the platform
/// has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("steward").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Load configuration from `path`, falling back to defaults.
///
/// - If the file does not exist, returns [`RouterConfig::default()`].
/// - If the file exists but fails to read, parse, or validate, logs a
///   warning and returns the default.
/// - Environment overrides are applied and the result validated again; an
///   override that makes the config invalid is discarded with a warning.
pub async fn load_config(path: &Path) -> RouterConfig {
    load_config_with(path, |key| std::env::var(key).ok()).await
}

async fn load_config_with(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> RouterConfig {
    let config = match try_load_file(path).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            RouterConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err} ({}), using defaults", path.display());
            RouterConfig::default()
        }
    };
    let overridden = apply_env_overrides(config.clone(), lookup);
    match validate(&overridden) {
        Ok(()) => overridden,
        Err(err) => {
            tracing::warn!("{err} after environment overrides, ignoring them");
            config
        }
    }
}

/// Load configuration from `path`, failing on any problem including a
/// missing file. Used when the caller named the file explicitly.
pub async fn load_config_strict(path: &Path) -> Result<RouterConfig, ConfigError> {
    let config = try_load_file(path)
        .await?
        .ok_or_else(|| ConfigError::Read(format!("{} does not exist", path.display())))?;
    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

async fn try_load_file(path: &Path) -> Result<Option<RouterConfig>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(ConfigError::Read(err.to_string())),
    };
    let config: RouterConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(Some(config))
}

/// Apply environment overrides through `lookup` (normally `std::env::var`).
/// Unparseable values are ignored with a warning.
pub fn apply_env_overrides(
    mut config: RouterConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> RouterConfig {
    if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.backend.base_url = url.trim().to_string();
    }
    if let Some(port) = lookup(PORT_ENV) {
        match port.trim().parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!("Ignoring {PORT_ENV}={port}: not a valid port"),
        }
    }
    config
}

/// Reject values the router cannot run with.
pub fn validate(config: &RouterConfig) -> Result<(), ConfigError> {
    let url = &config.backend.base_url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid(format!(
            "backend.base_url must be an http(s) URL, got '{url}'"
        )));
    }
    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::Invalid("backend.timeout_secs must be positive".into()));
    }
    if config.memory.history_limit == 0 {
        return Err(ConfigError::Invalid("memory.history_limit must be positive".into()));
    }
    if config.memory.session_ttl_minutes <= 0 {
        return Err(ConfigError::Invalid(
            "memory.session_ttl_minutes must be positive".into(),
        ));
    }
    if config.memory.purge_interval_secs == 0 {
        return Err(ConfigError::Invalid(
            "memory.purge_interval_secs must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = try_load_file(&tmp.path().join("config.toml")).await.unwrap();
        assert!(config.is_none());
        let config = load_config(&tmp.path().join("config.toml")).await;
        assert_eq!(config.memory.history_limit, 50);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
confirm_deletes = false

[backend]
base_url = "https://crm.example.com/api"
timeout_secs = 10

[memory]
session_ttl_minutes = 15
"#,
        )
        .await
        .unwrap();

        let config = try_load_file(&path).await.unwrap().unwrap();
        assert!(!config.confirm_deletes);
        assert_eq!(config.backend.base_url, "https://crm.example.com/api");
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.memory.session_ttl_minutes, 15);
        assert_eq!(config.memory.history_limit, 50);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!").await.unwrap();

        let err = try_load_file(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(load_config_strict(&path).await.is_err());
    }

    #[tokio::test]
    async fn load_config_strict_requires_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_config_strict(&tmp.path().join("missing.toml")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }

    #[tokio::test]
    async fn load_config_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "[memory]\nhistory_limit = 0\n").await.unwrap();
        let err = try_load_file(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[tokio::test]
    async fn load_config_discards_invalid_env_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "[backend]\nbase_url = \"https://crm.example.com/api\"\n")
            .await
            .unwrap();

        let config = load_config_with(&path, |key| {
            (key == BACKEND_URL_ENV).then(|| "foo".to_string())
        })
        .await;
        assert_eq!(config.backend.base_url, "https://crm.example.com/api");
        assert!(validate(&config).is_ok());

        let config = load_config_with(&path, |key| {
            (key == BACKEND_URL_ENV).then(|| "http://backend:4000/api".to_string())
        })
        .await;
        assert_eq!(config.backend.base_url, "http://backend:4000/api");
    }

    #[test]
    fn env_overrides_apply() {
        let config = apply_env_overrides(RouterConfig::default(), |key| match key {
            BACKEND_URL_ENV => Some("http://backend:4000/api".to_string()),
            PORT_ENV => Some("9090".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.base_url, "http://backend:4000/api");
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn env_overrides_ignore_bad_port() {
        let config = apply_env_overrides(RouterConfig::default(), |key| {
            (key == PORT_ENV).then(|| "not-a-port".to_string())
        });
        assert_eq!(config.server.port, 8000);
        let config = apply_env_overrides(RouterConfig::default(), no_env);
        assert_eq!(config.backend.base_url, "http://localhost:3001/api");
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let mut config = RouterConfig::default();
        config.backend.base_url = "ftp://nope".to_string();
        assert!(validate(&config).is_err());
        assert!(validate(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn default_config_path_ends_with_file_name() {
        assert!(default_config_path().ends_with("config.toml"));
    }
}
