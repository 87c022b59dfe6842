//! Intent -> backend call -> rendered response.
//!
//! The dispatcher is the error boundary of a turn: backend failures are
//! logged here and turned into an `error` outcome with a short apology, so
//! nothing propagates to the chat service. Calls are never retried.

use steward_types::error::BackendError;
use steward_types::intent::{EntityKind, Intent, Operation};
use steward_types::params::ParameterSet;
use steward_types::record::Record;
use steward_types::session::ObservedEntity;

use crate::backend::client::BackendClient;

use super::render;

/// Result of dispatching one intent.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// The intent reported to the caller. Becomes [`Intent::Error`] when
    /// the backend call failed.
    pub intent: Intent,
    pub response: String,
    /// Client entities seen in the backend result, for the session's cache.
    pub observed: Vec<ObservedEntity>,
}

impl DispatchOutcome {
    fn message(intent: Intent, response: impl Into<String>) -> Self {
        Self {
            intent,
            response: response.into(),
            observed: Vec::new(),
        }
    }

    fn with_records<'a>(mut self, records: impl IntoIterator<Item = &'a Record>) -> Self {
        self.observed = records.into_iter().filter_map(Record::observed_entity).collect();
        self
    }
}

/// Maps resolved intents onto a [`BackendClient`].
pub struct Dispatcher<B: BackendClient> {
    backend: B,
}

impl<B: BackendClient> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Execute `intent` with `params` and render the result.
    #[tracing::instrument(name = "dispatch", skip(self, intent, params), fields(intent = %intent))]
    pub async fn dispatch(&self, intent: Intent, params: &ParameterSet) -> DispatchOutcome {
        let Intent::Backend(kind, op) = intent else {
            let message = params
                .text("message")
                .unwrap_or("I don't understand that request.");
            return DispatchOutcome::message(intent, message);
        };

        tracing::info!(%kind, operation = op.as_str(), params = params.len(), "Dispatching to backend");

        let result = match op {
            Operation::List => self.list(kind).await,
            Operation::Get => self.get(kind, params).await,
            Operation::Add => self.create(kind, params).await,
            Operation::Update => self.update(kind, params).await,
            Operation::Delete => self.delete(kind, params).await,
        };

        match result {
            Ok(outcome) => outcome,
            Err(BackendError::NotFound) => {
                let id = params.text("id").unwrap_or_default();
                DispatchOutcome::message(intent, render::render_not_found(kind, id))
            }
            Err(err) => {
                tracing::error!(
                    %kind,
                    operation = op.as_str(),
                    category = err.category(),
                    status = err.status(),
                    error = %err,
                    "Backend call failed"
                );
                DispatchOutcome::message(Intent::Error, render::render_error(&err))
            }
        }
    }

    async fn list(&self, kind: EntityKind) -> Result<DispatchOutcome, BackendError> {
        let records = self.backend.list(kind).await?;
        let intent = Intent::backend(kind, Operation::List);
        Ok(DispatchOutcome::message(intent, render::render_list(kind, &records)).with_records(&records))
    }

    async fn get(&self, kind: EntityKind, params: &ParameterSet) -> Result<DispatchOutcome, BackendError> {
        let intent = Intent::backend(kind, Operation::Get);
        let Some(id) = params.text("id") else {
            return Ok(DispatchOutcome::message(intent, render::render_missing_id(kind)));
        };
        Ok(match self.backend.get(kind, id).await? {
            Some(record) => DispatchOutcome::message(intent, render::render_details(&record))
                .with_records([&record]),
            None => DispatchOutcome::message(intent, render::render_not_found(kind, id)),
        })
    }

    async fn create(&self, kind: EntityKind, params: &ParameterSet) -> Result<DispatchOutcome, BackendError> {
        let record = self.backend.create(kind, params).await?;
        let intent = Intent::backend(kind, Operation::Add);
        Ok(DispatchOutcome::message(intent, render::render_created(&record)).with_records([&record]))
    }

    async fn update(&self, kind: EntityKind, params: &ParameterSet) -> Result<DispatchOutcome, BackendError> {
        let intent = Intent::backend(kind, Operation::Update);
        let Some(id) = params.text("id") else {
            return Ok(DispatchOutcome::message(intent, render::render_missing_id(kind)));
        };
        let fields = params.without("id");
        if fields.is_empty() {
            return Ok(DispatchOutcome::message(intent, render::render_missing_fields(kind, id)));
        }
        let record = self.backend.update(kind, id, &fields).await?;
        Ok(DispatchOutcome::message(intent, render::render_updated(kind)).with_records([&record]))
    }

    async fn delete(&self, kind: EntityKind, params: &ParameterSet) -> Result<DispatchOutcome, BackendError> {
        let intent = Intent::backend(kind, Operation::Delete);
        let Some(id) = params.text("id") else {
            return Ok(DispatchOutcome::message(intent, render::render_missing_id(kind)));
        };
        self.backend.delete(kind, id).await?;
        Ok(DispatchOutcome::message(intent, render::render_deleted(kind)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory backend keyed by kind, counting every call. A non-zero
    /// `latency` makes `list` sleep and records how many lists overlapped.
    #[derive(Default)]
    pub(crate) struct MockBackend {
        pub records: Mutex<HashMap<EntityKind, Vec<Value>>>,
        pub calls: AtomicUsize,
        pub fail_with: Mutex<Option<u16>>,
        pub deleted: Mutex<Vec<(EntityKind, String)>>,
        pub latency: Duration,
        pub in_flight: AtomicUsize,
        pub peak_in_flight: AtomicUsize,
    }

    impl MockBackend {
        pub(crate) fn with(kind: EntityKind, values: Vec<Value>) -> Self {
            let backend = Self::default();
            backend.records.lock().unwrap().insert(kind, values);
            backend
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn max_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }

        async fn pause(&self) {
            if self.latency.is_zero() {
                return;
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        fn begin(&self) -> Result<(), BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match *self.fail_with.lock().unwrap() {
                Some(status) => Err(BackendError::Status {
                    status,
                    message: "backend exploded".to_string(),
                }),
                None => Ok(()),
            }
        }

        fn find(&self, kind: EntityKind, id: &str) -> Option<Value> {
            self.records
                .lock()
                .unwrap()
                .get(&kind)?
                .iter()
                .find(|v| v["id"].to_string() == id)
                .cloned()
        }
    }

    impl BackendClient for MockBackend {
        async fn list(&self, kind: EntityKind) -> Result<Vec<Record>, BackendError> {
            self.pause().await;
            self.begin()?;
            let values = self.records.lock().unwrap().get(&kind).cloned().unwrap_or_default();
            values
                .into_iter()
                .map(|v| Record::from_json(kind, v).map_err(|e| BackendError::Decode(e.to_string())))
                .collect()
        }

        async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Record>, BackendError> {
            self.begin()?;
            self.find(kind, id)
                .map(|v| Record::from_json(kind, v).map_err(|e| BackendError::Decode(e.to_string())))
                .transpose()
        }

        async fn create(&self, kind: EntityKind, fields: &ParameterSet) -> Result<Record, BackendError> {
            self.begin()?;
            let mut value = fields.to_json();
            let mut records = self.records.lock().unwrap();
            let entries = records.entry(kind).or_default();
            value["id"] = json!(entries.len() as i64 + 100);
            entries.push(value.clone());
            Record::from_json(kind, value).map_err(|e| BackendError::Decode(e.to_string()))
        }

        async fn update(
            &self,
            kind: EntityKind,
            id: &str,
            fields: &ParameterSet,
        ) -> Result<Record, BackendError> {
            self.begin()?;
            let mut value = self.find(kind, id).ok_or(BackendError::NotFound)?;
            if let (Value::Object(target), Value::Object(changes)) = (&mut value, fields.to_json()) {
                target.extend(changes);
            }
            Record::from_json(kind, value).map_err(|e| BackendError::Decode(e.to_string()))
        }

        async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), BackendError> {
            self.begin()?;
            self.find(kind, id).ok_or(BackendError::NotFound)?;
            self.deleted.lock().unwrap().push((kind, id.to_string()));
            Ok(())
        }
    }

    fn acme() -> Value {
        json!({"id": 7, "name": "Acme Inc", "niche": "technology", "contact_email": "hello@acme.com"})
    }

    #[tokio::test]
    async fn test_respond_returns_carried_message() {
        let dispatcher = Dispatcher::new(MockBackend::default());
        let params = ParameterSet::new().with("message", "hello there");
        let outcome = dispatcher.dispatch(Intent::Respond, &params).await;
        assert_eq!(outcome.response, "hello there");
        assert_eq!(dispatcher.backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_list_clients_observes_entities() {
        let dispatcher = Dispatcher::new(MockBackend::with(EntityKind::Client, vec![acme()]));
        let outcome = dispatcher
            .dispatch(Intent::backend(EntityKind::Client, Operation::List), &ParameterSet::new())
            .await;
        assert!(outcome.response.starts_with("### Client List"));
        assert_eq!(outcome.observed.len(), 1);
        assert_eq!(outcome.observed[0].niche.as_deref(), Some("technology"));
    }

    #[tokio::test]
    async fn test_get_missing_record_is_not_found() {
        let dispatcher = Dispatcher::new(MockBackend::with(EntityKind::Client, vec![acme()]));
        let params = ParameterSet::new().with("id", "99");
        let intent = Intent::backend(EntityKind::Client, Operation::Get);
        let outcome = dispatcher.dispatch(intent, &params).await;
        assert_eq!(outcome.intent, intent);
        assert!(outcome.response.contains("couldn't find a client with ID 99"));
        assert!(outcome.observed.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_error_intent() {
        let backend = MockBackend::default();
        *backend.fail_with.lock().unwrap() = Some(500);
        let dispatcher = Dispatcher::new(backend);
        let outcome = dispatcher
            .dispatch(Intent::backend(EntityKind::Campaign, Operation::List), &ParameterSet::new())
            .await;
        assert_eq!(outcome.intent, Intent::Error);
        assert!(outcome.response.starts_with("Sorry, I encountered an error:"));
        assert_eq!(dispatcher.backend().call_count(), 1);
    }

    #[tokio::test]
    async fn test_add_client_passes_params_and_observes() {
        let dispatcher = Dispatcher::new(MockBackend::default());
        let params = ParameterSet::new()
            .with("name", "Initech")
            .with("niche", "software");
        let outcome = dispatcher
            .dispatch(Intent::backend(EntityKind::Client, Operation::Add), &params)
            .await;
        assert!(outcome.response.contains("Successfully added client: **Initech** with ID: **100**"));
        assert_eq!(outcome.observed[0].id, 100);
        assert_eq!(outcome.observed[0].niche.as_deref(), Some("software"));
    }

    #[tokio::test]
    async fn test_update_without_fields_skips_backend() {
        let dispatcher = Dispatcher::new(MockBackend::with(EntityKind::Client, vec![acme()]));
        let params = ParameterSet::new().with("id", "7");
        let outcome = dispatcher
            .dispatch(Intent::backend(EntityKind::Client, Operation::Update), &params)
            .await;
        assert!(outcome.response.starts_with("Tell me what to change"));
        assert_eq!(dispatcher.backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_reports_new_attributes() {
        let dispatcher = Dispatcher::new(MockBackend::with(EntityKind::Client, vec![acme()]));
        let params = ParameterSet::new().with("id", "7").with("niche", "finance");
        let outcome = dispatcher
            .dispatch(Intent::backend(EntityKind::Client, Operation::Update), &params)
            .await;
        assert_eq!(outcome.response, render::render_updated(EntityKind::Client));
        assert_eq!(outcome.observed[0].niche.as_deref(), Some("finance"));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let dispatcher = Dispatcher::new(MockBackend::default());
        let params = ParameterSet::new().with("id", "abc");
        let outcome = dispatcher
            .dispatch(Intent::backend(EntityKind::ContentIdea, Operation::Delete), &params)
            .await;
        assert_ne!(outcome.intent, Intent::Error);
        assert!(outcome.response.contains("couldn't find a content idea with ID abc"));
    }
}
