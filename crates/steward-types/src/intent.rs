//! Intent tags chosen by the resolver for a prompt.
//!
//! An [`Intent`] is either a backend operation (an [`EntityKind`] paired with
//! an [`Operation`]) or one of the synthetic intents that never reach the
//! backend. Every intent has a stable snake_case tag (`list_clients`,
//! `get_content_idea`, `respond`, ...) used in logs and API responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kinds of record the backend CRUD service owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Campaign,
    ContentIdea,
    MarketingData,
}

impl EntityKind {
    /// All kinds, in resolver precedence order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Client,
        EntityKind::Campaign,
        EntityKind::ContentIdea,
        EntityKind::MarketingData,
    ];

    /// Singular snake_case name used in intent tags (`get_client`).
    pub fn singular(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Campaign => "campaign",
            EntityKind::ContentIdea => "content_idea",
            EntityKind::MarketingData => "marketing_data",
        }
    }

    /// Plural snake_case name used in list tags (`list_clients`) and as the
    /// entity-cache key.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Client => "clients",
            EntityKind::Campaign => "campaigns",
            EntityKind::ContentIdea => "content_ideas",
            EntityKind::MarketingData => "marketing_data",
        }
    }

    /// Human-readable label for messages ("content idea").
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Campaign => "campaign",
            EntityKind::ContentIdea => "content idea",
            EntityKind::MarketingData => "marketing data entry",
        }
    }

    /// URL path segment on the backend API (`/content-ideas`).
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Client => "clients",
            EntityKind::Campaign => "campaigns",
            EntityKind::ContentIdea => "content-ideas",
            EntityKind::MarketingData => "marketing-data",
        }
    }

    /// Key under which the backend wraps a created/updated record
    /// (`{"message": "...", "client": {...}}`).
    pub fn envelope_key(&self) -> &'static str {
        self.singular()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "client" | "clients" => Ok(EntityKind::Client),
            "campaign" | "campaigns" => Ok(EntityKind::Campaign),
            "content_idea" | "content_ideas" | "idea" | "ideas" => Ok(EntityKind::ContentIdea),
            "marketing_data" => Ok(EntityKind::MarketingData),
            other => Err(format!("invalid entity kind: '{other}'")),
        }
    }
}

/// CRUD verb of a backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Get,
    Add,
    Update,
    Delete,
}

impl Operation {
    /// All operations, in resolver precedence order within a kind.
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Get,
        Operation::Add,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Add => "add",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Symbolic operation tag chosen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Intent {
    /// A backend CRUD call.
    Backend(EntityKind, Operation),
    /// Return a carried message directly; no backend call.
    Respond,
    /// The prompt matched nothing.
    Unknown,
    /// The backend call for this turn failed.
    Error,
    /// Execute the session's pending action.
    ConfirmAction,
    /// Discard the session's pending action.
    CancelAction,
}

impl Intent {
    pub const fn backend(kind: EntityKind, op: Operation) -> Self {
        Intent::Backend(kind, op)
    }

    /// Whether dispatching this intent calls the backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, Intent::Backend(..))
    }

    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Intent::Backend(kind, _) => Some(*kind),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Intent::Backend(_, op) => Some(*op),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Backend(kind, Operation::List) => write!(f, "list_{}", kind.plural()),
            Intent::Backend(kind, op) => write!(f, "{}_{}", op.as_str(), kind.singular()),
            Intent::Respond => f.write_str("respond"),
            Intent::Unknown => f.write_str("unknown"),
            Intent::Error => f.write_str("error"),
            Intent::ConfirmAction => f.write_str("confirm_action"),
            Intent::CancelAction => f.write_str("cancel_action"),
        }
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "respond" => return Ok(Intent::Respond),
            "unknown" => return Ok(Intent::Unknown),
            "error" => return Ok(Intent::Error),
            "confirm_action" => return Ok(Intent::ConfirmAction),
            "cancel_action" => return Ok(Intent::CancelAction),
            _ => {}
        }

        for kind in EntityKind::ALL {
            for op in Operation::ALL {
                let intent = Intent::Backend(kind, op);
                if intent.to_string() == s {
                    return Ok(intent);
                }
            }
        }

        Err(format!("invalid intent: '{s}'"))
    }
}

impl TryFrom<String> for Intent {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl From<Intent> for String {
    fn from(intent: Intent) -> Self {
        intent.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_tags() {
        assert_eq!(
            Intent::backend(EntityKind::Client, Operation::List).to_string(),
            "list_clients"
        );
        assert_eq!(
            Intent::backend(EntityKind::ContentIdea, Operation::Get).to_string(),
            "get_content_idea"
        );
        assert_eq!(
            Intent::backend(EntityKind::MarketingData, Operation::List).to_string(),
            "list_marketing_data"
        );
        assert_eq!(Intent::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_intent_parse_every_tag() {
        for kind in EntityKind::ALL {
            for op in Operation::ALL {
                let intent = Intent::backend(kind, op);
                assert_eq!(intent.to_string().parse::<Intent>().unwrap(), intent);
            }
        }
        assert_eq!("respond".parse::<Intent>().unwrap(), Intent::Respond);
        assert!("fly_to_moon".parse::<Intent>().is_err());
    }

    #[test]
    fn test_intent_serde_as_tag() {
        let json = serde_json::to_string(&Intent::backend(EntityKind::Client, Operation::Add)).unwrap();
        assert_eq!(json, "\"add_client\"");
        let parsed: Intent = serde_json::from_str("\"delete_campaign\"").unwrap();
        assert_eq!(parsed, Intent::backend(EntityKind::Campaign, Operation::Delete));
    }

    #[test]
    fn test_entity_kind_paths() {
        assert_eq!(EntityKind::ContentIdea.path(), "content-ideas");
        assert_eq!(EntityKind::ContentIdea.envelope_key(), "content_idea");
        assert_eq!("content-ideas".parse::<EntityKind>().unwrap(), EntityKind::ContentIdea);
    }
}
