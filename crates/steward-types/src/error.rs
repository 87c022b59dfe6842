use thiserror::Error;

/// Failures reported by the backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed backend payload: {0}")]
    Decode(String),

    #[error("record not found")]
    NotFound,
}

impl BackendError {
    /// Short machine-readable category for logs and API errors.
    pub fn category(&self) -> &'static str {
        match self {
            BackendError::Transport(_) => "transport",
            BackendError::Status { status, .. } if (400..500).contains(status) => "client_error",
            BackendError::Status { .. } => "server_error",
            BackendError::Decode(_) => "decode",
            BackendError::NotFound => "not_found",
        }
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::NotFound => Some(404),
            _ => None,
        }
    }
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Errors from session administration.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("invalid session id: '{0}'")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Status {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned HTTP 500: Internal Server Error");
    }

    #[test]
    fn test_backend_error_category() {
        assert_eq!(BackendError::Transport("refused".into()).category(), "transport");
        assert_eq!(
            BackendError::Status { status: 422, message: String::new() }.category(),
            "client_error"
        );
        assert_eq!(
            BackendError::Status { status: 503, message: String::new() }.category(),
            "server_error"
        );
        assert_eq!(BackendError::NotFound.status(), Some(404));
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::InvalidId(String::new());
        assert_eq!(err.to_string(), "invalid session id: ''");
    }
}
