//! Chat service orchestrating one conversational turn.
//!
//! ChatService ties together session memory, the intent resolver, and the
//! dispatcher: it records the user's prompt, resolves it against the
//! session's remembered clients, runs (or parks) the backend call, and
//! records the reply together with the entities the backend reported.
//!
//! Turns for the same session are serialized by a per-session tokio mutex;
//! different sessions never wait on each other.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use steward_types::error::SessionError;
use steward_types::intent::{EntityKind, Intent, Operation};
use steward_types::session::{Interaction, PendingAction, Role};

use crate::backend::client::BackendClient;
use crate::dispatch::{Dispatcher, render};
use crate::intent::resolver::{ConfirmationReply, IntentResolver, confirmation_reply};
use crate::memory::SessionMemory;

/// Longest accepted caller-supplied session id.
const MAX_SESSION_ID_LEN: usize = 128;

/// The outcome of one turn as seen by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub response: String,
    pub intent: Intent,
}

/// Orchestrates turns over a shared [`SessionMemory`].
///
/// Generic over `BackendClient` so steward-core never depends on the HTTP
/// implementation in steward-infra.
pub struct ChatService<B: BackendClient> {
    dispatcher: Dispatcher<B>,
    memory: Arc<SessionMemory>,
    turn_locks: DashMap<String, Arc<Mutex<()>>>,
    confirm_deletes: bool,
}

impl<B: BackendClient> ChatService<B> {
    pub fn new(backend: B, memory: Arc<SessionMemory>, confirm_deletes: bool) -> Self {
        Self {
            dispatcher: Dispatcher::new(backend),
            memory,
            turn_locks: DashMap::new(),
            confirm_deletes,
        }
    }

    pub fn memory(&self) -> &Arc<SessionMemory> {
        &self.memory
    }

    pub fn dispatcher(&self) -> &Dispatcher<B> {
        &self.dispatcher
    }

    /// Process one prompt. A missing or blank `session_id` starts a new
    /// session with a generated id.
    #[tracing::instrument(name = "chat_turn", skip(self, session_id, prompt), fields(session_id))]
    pub async fn handle(
        &self,
        session_id: Option<String>,
        prompt: &str,
    ) -> Result<ChatReply, SessionError> {
        let session_id = resolve_session_id(session_id)?;
        tracing::Span::current().record("session_id", session_id.as_str());

        let lock = self.turn_lock(&session_id);
        let _turn = lock.lock().await;

        self.memory.append(&session_id, Role::User, prompt);

        let (intent, response) = match self.memory.take_pending(&session_id) {
            Some(pending) => match confirmation_reply(prompt) {
                Some(reply) => self.settle_pending(&session_id, pending, reply).await,
                None => {
                    debug!(intent = %pending.intent, "Discarding pending action");
                    self.resolve_and_dispatch(&session_id, prompt).await
                }
            },
            None => self.resolve_and_dispatch(&session_id, prompt).await,
        };

        info!(intent = %intent, "Turn complete");
        Ok(ChatReply {
            session_id,
            response,
            intent,
        })
    }

    async fn resolve_and_dispatch(&self, session_id: &str, prompt: &str) -> (Intent, String) {
        let clients = self.memory.tracked_entities(session_id, EntityKind::Client);
        let resolution = IntentResolver::resolve(prompt, &clients);

        if let (true, Intent::Backend(kind, Operation::Delete), Some(id)) = (
            self.confirm_deletes,
            resolution.intent,
            resolution.params.text("id"),
        ) {
            let response = render::render_confirm_delete(kind, id);
            self.memory.set_pending(
                session_id,
                PendingAction {
                    intent: resolution.intent,
                    params: resolution.params.clone(),
                    created_at: Utc::now(),
                },
            );
            self.memory.append(session_id, Role::Assistant, response.as_str());
            return (resolution.intent, response);
        }

        let outcome = self
            .dispatcher
            .dispatch(resolution.intent, &resolution.params)
            .await;
        self.memory
            .append_reply(session_id, outcome.response.as_str(), EntityKind::Client, outcome.observed);
        (outcome.intent, outcome.response)
    }

    async fn settle_pending(
        &self,
        session_id: &str,
        pending: PendingAction,
        reply: ConfirmationReply,
    ) -> (Intent, String) {
        match reply {
            ConfirmationReply::Confirm => {
                let outcome = self.dispatcher.dispatch(pending.intent, &pending.params).await;
                let intent = match outcome.intent {
                    Intent::Error => Intent::Error,
                    _ => Intent::ConfirmAction,
                };
                self.memory.append_reply(
                    session_id,
                    outcome.response.as_str(),
                    EntityKind::Client,
                    outcome.observed,
                );
                (intent, outcome.response)
            }
            ConfirmationReply::Cancel => {
                let response = match pending.intent {
                    Intent::Backend(kind, _) => {
                        render::render_cancelled(kind, pending.params.text("id").unwrap_or_default())
                    }
                    _ => "Okay, nothing was changed.".to_string(),
                };
                self.memory.append(session_id, Role::Assistant, response.as_str());
                (Intent::CancelAction, response)
            }
        }
    }

    fn turn_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Purge expired sessions and the turn locks nobody holds any more.
    pub fn purge_expired(&self) -> usize {
        let removed = self.memory.purge_expired();
        self.turn_locks
            .retain(|id, lock| self.memory.contains(id) || Arc::strong_count(lock) > 1);
        removed
    }

    /// Drop a session once any in-flight turn for it has finished. Returns
    /// false for unknown sessions.
    ///
    /// The turn lock entry stays in place: a turn already queued on it must
    /// keep excluding later ones. [`purge_expired`](Self::purge_expired)
    /// reclaims it once nobody holds it.
    pub async fn remove_session(&self, session_id: &str) -> bool {
        if !self.memory.contains(session_id) {
            return false;
        }
        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;
        self.memory.remove(session_id)
    }

    /// Forget a session's history, entities and pending action, serialized
    /// with its turns.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        if !self.memory.contains(session_id) {
            return false;
        }
        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;
        self.memory.clear(session_id)
    }

    /// Replace a session's memory with a stored transcript, serialized with
    /// its turns. Returns the number of interactions retained.
    pub async fn import_transcript(&self, session_id: &str, interactions: Vec<Interaction>) -> usize {
        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;
        self.memory.import_transcript(session_id, interactions)
    }
}

fn resolve_session_id(session_id: Option<String>) -> Result<String, SessionError> {
    let Some(id) = session_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(Uuid::new_v4().to_string());
    };
    if id.len() > MAX_SESSION_ID_LEN || id.chars().any(char::is_control) {
        return Err(SessionError::InvalidId(id));
    }
    Ok(id)
}
