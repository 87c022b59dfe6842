//! Conversation types: interactions, tracked entities, pending actions.
//!
//! These types model the volatile per-session memory of the router. None of
//! them are persisted; they live only as long as their session.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::{EntityKind, Intent};
use crate::params::ParameterSet;

/// Author of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// One turn of conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    /// Create an interaction stamped with the current time.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A record remembered for later turns so the user can refer to it without
/// restating its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub id: i64,
    pub name: String,
    pub niche: Option<String>,
    pub contact_email: Option<String>,
    pub last_mentioned: DateTime<Utc>,
}

/// An entity seen in a backend result or a rendered response, before it is
/// merged into the session's cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedEntity {
    pub id: i64,
    pub name: String,
    pub niche: Option<String>,
    pub contact_email: Option<String>,
}

impl ObservedEntity {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            niche: None,
            contact_email: None,
        }
    }

    pub fn with_niche(mut self, niche: Option<String>) -> Self {
        self.niche = niche;
        self
    }

    pub fn with_contact_email(mut self, email: Option<String>) -> Self {
        self.contact_email = email;
        self
    }
}

/// A mutating backend call waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub intent: Intent,
    pub params: ParameterSet,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of everything remembered for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub conversation_history: Vec<Interaction>,
    pub entities: BTreeMap<EntityKind, Vec<TrackedEntity>>,
    pub message_count: usize,
    pub pending_action: Option<PendingAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::User, Role::Assistant] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("system".parse::<Role>().is_err());
    }

    #[test]
    fn test_interaction_serialize() {
        let interaction = Interaction::now(Role::Assistant, "### Client List");
        let json = serde_json::to_string(&interaction).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_observed_entity_builder() {
        let entity = ObservedEntity::new(7, "Acme Inc")
            .with_niche(Some("technology".to_string()))
            .with_contact_email(None);
        assert_eq!(entity.id, 7);
        assert_eq!(entity.niche.as_deref(), Some("technology"));
        assert!(entity.contact_email.is_none());
    }
}
