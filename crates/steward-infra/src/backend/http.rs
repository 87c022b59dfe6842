//! REST implementation of [`BackendClient`].
//!
//! Each entity kind lives under `{base_url}/{path}`:
//!
//! | operation | request                   | success            |
//! |-----------|---------------------------|--------------------|
//! | list      | `GET /clients`            | 200, JSON array    |
//! | get       | `GET /clients/{id}`       | 200, object        |
//! | create    | `POST /clients`           | 201, envelope      |
//! | update    | `PUT /clients/{id}`       | 200, envelope      |
//! | delete    | `DELETE /clients/{id}`    | 204                |
//!
//! Create and update wrap the record as `{"message": ..., "client": {...}}`;
//! a bare object is accepted as well. Error bodies carry `{"error": "..."}`.

use std::time::Duration;

use serde_json::Value;

use steward_core::backend::client::BackendClient;
use steward_types::config::BackendConfig;
use steward_types::error::BackendError;
use steward_types::intent::EntityKind;
use steward_types::params::ParameterSet;
use steward_types::record::Record;

/// HTTP client for the backend CRUD API.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackendClient {
    /// Build a client with the configured base URL and request timeout.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, kind.path())
    }

    fn record_url(&self, kind: EntityKind, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, kind.path(), id.trim())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            message: error_message(&body, status.canonical_reason().unwrap_or("error")),
        })
    }

    async fn json(response: reqwest::Response) -> Result<Value, BackendError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| BackendError::Decode(format!("failed to parse response: {e}")))
    }
}

impl BackendClient for HttpBackendClient {
    #[tracing::instrument(skip(self, kind), fields(kind = %kind))]
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>, BackendError> {
        let response = self.send(self.client.get(self.collection_url(kind))).await?;
        decode_list(kind, Self::json(response).await?)
    }

    #[tracing::instrument(skip(self, kind), fields(kind = %kind))]
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Record>, BackendError> {
        match self.send(self.client.get(self.record_url(kind, id))).await {
            Ok(response) => decode_record(kind, Self::json(response).await?).map(Some),
            Err(BackendError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(skip(self, kind, fields), fields(kind = %kind))]
    async fn create(&self, kind: EntityKind, fields: &ParameterSet) -> Result<Record, BackendError> {
        let request = self.client.post(self.collection_url(kind)).json(&fields.to_json());
        let response = self.send(request).await?;
        decode_record(kind, Self::json(response).await?)
    }

    #[tracing::instrument(skip(self, kind, fields), fields(kind = %kind))]
    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &ParameterSet,
    ) -> Result<Record, BackendError> {
        let request = self.client.put(self.record_url(kind, id)).json(&fields.to_json());
        let response = self.send(request).await?;
        decode_record(kind, Self::json(response).await?)
    }

    #[tracing::instrument(skip(self, kind), fields(kind = %kind))]
    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), BackendError> {
        self.send(self.client.delete(self.record_url(kind, id))).await?;
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Transport("request timed out".to_string())
    } else if e.is_connect() {
        BackendError::Transport("connection refused".to_string())
    } else {
        BackendError::Transport(e.to_string())
    }
}

/// The `error` field of a JSON error body, else the raw body, else `fallback`.
fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = value.get("error").or_else(|| value.get("message")).and_then(Value::as_str) {
            return msg.to_string();
        }
    }
    let body = body.trim();
    if body.is_empty() {
        fallback.to_string()
    } else {
        body.chars().take(200).collect()
    }
}

fn decode_list(kind: EntityKind, value: Value) -> Result<Vec<Record>, BackendError> {
    let Value::Array(items) = value else {
        return Err(BackendError::Decode(format!("expected a JSON array of {kind}")));
    };
    items.into_iter().map(|item| decode_record(kind, item)).collect()
}

/// Decode a record, unwrapping the `{"message", "<kind>": {...}}` envelope.
fn decode_record(kind: EntityKind, mut value: Value) -> Result<Record, BackendError> {
    let key = kind.envelope_key();
    let inner = if value.get(key).is_some_and(Value::is_object) {
        value[key].take()
    } else {
        value
    };
    Record::from_json(kind, inner)
        .map_err(|e| BackendError::Decode(format!("invalid {} record: {e}", kind.label())))
}
