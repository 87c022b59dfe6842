//! Volatile per-session conversation memory.
//!
//! `SessionMemory` owns every session's bounded history, its recency-ordered
//! entity cache, and any action awaiting confirmation. State lives in a
//! `DashMap` keyed by session id, so each call is atomic for its session and
//! distinct sessions proceed concurrently. Sequences of calls that make up a
//! turn or an admin operation are serialized by `ChatService`'s per-session
//! turn lock.
//!
//! Nothing here is persisted. Sessions disappear when [`SessionMemory::purge_expired`]
//! finds their last interaction older than the configured TTL.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use steward_types::config::MemoryConfig;
use steward_types::intent::EntityKind;
use steward_types::session::{
    Interaction, ObservedEntity, PendingAction, Role, SessionSummary, TrackedEntity,
};

use super::extractor::EntityExtractor;

#[derive(Debug, Default)]
struct SessionState {
    history: VecDeque<Interaction>,
    entities: BTreeMap<EntityKind, Vec<TrackedEntity>>,
    pending: Option<PendingAction>,
}

impl SessionState {
    fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.history.back().map(|i| i.timestamp)
    }

    fn push(&mut self, interaction: Interaction, limit: usize) {
        self.history.push_back(interaction);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    fn track(&mut self, kind: EntityKind, observed: ObservedEntity, at: DateTime<Utc>) {
        let tracked = self.entities.entry(kind).or_default();
        match tracked.iter_mut().find(|e| e.id == observed.id) {
            Some(existing) => {
                existing.last_mentioned = at;
                if !observed.name.trim().is_empty() {
                    existing.name = observed.name;
                }
                if observed.niche.is_some() {
                    existing.niche = observed.niche;
                }
                if observed.contact_email.is_some() {
                    existing.contact_email = observed.contact_email;
                }
            }
            None => tracked.push(TrackedEntity {
                id: observed.id,
                name: observed.name,
                niche: observed.niche,
                contact_email: observed.contact_email,
                last_mentioned: at,
            }),
        }
    }

    /// Push one interaction and track the clients seen in it.
    fn absorb(&mut self, interaction: Interaction, observed: Vec<ObservedEntity>, limit: usize) {
        let at = interaction.timestamp;
        self.push(interaction, limit);
        for entity in observed {
            self.track(EntityKind::Client, entity, at);
        }
    }

    fn sorted_entities(&self, kind: EntityKind) -> Vec<TrackedEntity> {
        let mut entities = self.entities.get(&kind).cloned().unwrap_or_default();
        entities.sort_by(|a, b| b.last_mentioned.cmp(&a.last_mentioned));
        entities
    }
}

/// Clients mentioned in an assistant turn; user text is never scanned.
fn scan(interaction: &Interaction) -> Vec<ObservedEntity> {
    match interaction.role {
        Role::Assistant => EntityExtractor::extract_clients(&interaction.content),
        Role::User => Vec::new(),
    }
}

/// Process-wide store of session memory, shared behind an `Arc`.
#[derive(Debug)]
pub struct SessionMemory {
    sessions: DashMap<String, SessionState>,
    config: MemoryConfig,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl SessionMemory {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Record one turn stamped with the current time.
    pub fn append(&self, session_id: &str, role: Role, content: impl Into<String>) {
        self.append_interaction(session_id, Interaction::now(role, content));
    }

    /// Record one turn with its own timestamp.
    ///
    /// History is truncated to the configured limit, oldest first. Assistant
    /// turns are scanned for client entities, which are tracked as mentioned
    /// at the interaction's timestamp.
    pub fn append_interaction(&self, session_id: &str, interaction: Interaction) {
        let observed = scan(&interaction);
        let mut state = self.sessions.entry(session_id.to_string()).or_default();
        state.absorb(interaction, observed, self.config.history_limit);

        tracing::debug!(
            session_id,
            history_len = state.history.len(),
            "Appended interaction"
        );
    }

    /// Record an assistant turn whose entities were already reported
    /// structurally. The text is not scanned.
    pub fn append_reply(
        &self,
        session_id: &str,
        content: impl Into<String>,
        kind: EntityKind,
        observed: Vec<ObservedEntity>,
    ) {
        let interaction = Interaction::now(Role::Assistant, content);
        let at = interaction.timestamp;
        let mut state = self.sessions.entry(session_id.to_string()).or_default();
        state.push(interaction, self.config.history_limit);
        for entity in observed {
            state.track(kind, entity, at);
        }
        tracing::debug!(session_id, history_len = state.history.len(), "Appended reply");
    }

    /// Track entities reported by the dispatcher, without parsing any text.
    pub fn observe(&self, session_id: &str, kind: EntityKind, entities: Vec<ObservedEntity>) {
        if entities.is_empty() {
            return;
        }
        let now = Utc::now();
        let count = entities.len();
        let mut state = self.sessions.entry(session_id.to_string()).or_default();
        for entity in entities {
            state.track(kind, entity, now);
        }
        tracing::debug!(session_id, %kind, count, "Observed entities");
    }

    /// The last `limit` interactions, oldest first. `None` or `Some(0)`
    /// returns the whole history; unknown sessions yield an empty history.
    pub fn history(&self, session_id: &str, limit: Option<usize>) -> Vec<Interaction> {
        let Some(state) = self.sessions.get(session_id) else {
            return Vec::new();
        };
        let skip = match limit {
            Some(n) if n > 0 => state.history.len().saturating_sub(n),
            _ => 0,
        };
        state.history.iter().skip(skip).cloned().collect()
    }

    /// The most recently mentioned entities of `kind`, newest first.
    /// `None` uses the configured default limit.
    pub fn recent_entities(
        &self,
        session_id: &str,
        kind: EntityKind,
        limit: Option<usize>,
    ) -> Vec<TrackedEntity> {
        let limit = limit.unwrap_or(self.config.recent_entity_limit);
        let mut entities = self.tracked_entities(session_id, kind);
        entities.truncate(limit);
        entities
    }

    /// Every tracked entity of `kind`, newest first.
    pub fn tracked_entities(&self, session_id: &str, kind: EntityKind) -> Vec<TrackedEntity> {
        self.sessions
            .get(session_id)
            .map(|state| state.sorted_entities(kind))
            .unwrap_or_default()
    }

    /// Remove every session idle longer than the TTL (or with no history).
    /// Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    /// [`purge_expired`](Self::purge_expired) against an explicit clock.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let ttl = Duration::minutes(self.config.session_ttl_minutes);
        let before = self.sessions.len();
        self.sessions.retain(|_, state| match state.last_activity() {
            Some(last) => now - last <= ttl,
            None => false,
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "Purged expired sessions");
        }
        removed
    }

    /// Ids of every live session, sorted.
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Everything remembered for a session, or `None` if it does not exist.
    pub fn summary(&self, session_id: &str) -> Option<SessionSummary> {
        let state = self.sessions.get(session_id)?;
        let entities = state
            .entities
            .keys()
            .map(|kind| (*kind, state.sorted_entities(*kind)))
            .collect();
        Some(SessionSummary {
            session_id: session_id.to_string(),
            conversation_history: state.history.iter().cloned().collect(),
            entities,
            message_count: state.history.len(),
            pending_action: state.pending.clone(),
        })
    }

    /// Forget a session's history, entities, and pending action. The entry
    /// itself stays until the next purge. Returns false for unknown sessions.
    pub fn clear(&self, session_id: &str) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(mut state) => {
                *state = SessionState::default();
                tracing::debug!(session_id, "Cleared session");
                true
            }
            None => false,
        }
    }

    /// Drop a session entirely. Returns false for unknown sessions.
    pub fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::debug!(session_id, "Removed session");
        }
        removed
    }

    /// Replace a session's memory with an externally stored transcript.
    /// Assistant turns are scanned for entities as they are replayed. The
    /// new state is built aside and swapped in with one insert, so readers
    /// never see a half-imported session. Returns the number of
    /// interactions retained.
    pub fn import_transcript(&self, session_id: &str, interactions: Vec<Interaction>) -> usize {
        let mut state = SessionState::default();
        for interaction in interactions {
            let observed = scan(&interaction);
            state.absorb(interaction, observed, self.config.history_limit);
        }
        let retained = state.history.len();
        self.sessions.insert(session_id.to_string(), state);
        tracing::debug!(session_id, retained, "Imported transcript");
        retained
    }

    /// Park an action until the user confirms or cancels it.
    pub fn set_pending(&self, session_id: &str, action: PendingAction) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .pending = Some(action);
    }

    /// Remove and return the session's pending action.
    pub fn take_pending(&self, session_id: &str) -> Option<PendingAction> {
        self.sessions.get_mut(session_id)?.pending.take()
    }
}
