//! HTTP request handlers.

pub mod admin;
pub mod chat;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support {
    use steward_types::config::RouterConfig;

    use crate::state::AppState;

    /// State whose backend points at a closed port; handlers that never
    /// reach the backend work normally.
    pub fn state() -> AppState {
        let mut config = RouterConfig::default();
        config.backend.base_url = "http://127.0.0.1:9/api".to_string();
        config.backend.timeout_secs = 1;
        AppState::init(config).unwrap()
    }
}
