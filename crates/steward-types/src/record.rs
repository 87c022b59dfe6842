//! Records returned by the backend CRUD service.
//!
//! Field names follow the backend's JSON exactly (including its camelCase
//! campaign fields). Everything except `id` and the display name is optional
//! because the backend does not enforce presence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::intent::EntityKind;
use crate::session::ObservedEntity;

/// A client of the agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub satisfaction: Option<Value>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A marketing campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub budget: Option<Value>,
    #[serde(default, rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(default, rename = "targetAudience")]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub channels: Option<Value>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
}

/// A content idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub id: i64,
    pub title: String,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
}

/// One month of marketing performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingData {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub revenue: Option<Value>,
    #[serde(default)]
    pub spend: Option<Value>,
    #[serde(default)]
    pub roi: Option<Value>,
    #[serde(default)]
    pub client: Option<String>,
}

/// A backend record of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Client(Client),
    Campaign(Campaign),
    ContentIdea(ContentIdea),
    MarketingData(MarketingData),
}

impl Record {
    /// Decode a JSON object as a record of `kind`.
    pub fn from_json(kind: EntityKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EntityKind::Client => Record::Client(serde_json::from_value(value)?),
            EntityKind::Campaign => Record::Campaign(serde_json::from_value(value)?),
            EntityKind::ContentIdea => Record::ContentIdea(serde_json::from_value(value)?),
            EntityKind::MarketingData => Record::MarketingData(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Client(_) => EntityKind::Client,
            Record::Campaign(_) => EntityKind::Campaign,
            Record::ContentIdea(_) => EntityKind::ContentIdea,
            Record::MarketingData(_) => EntityKind::MarketingData,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Record::Client(c) => Some(c.id),
            Record::Campaign(c) => Some(c.id),
            Record::ContentIdea(i) => Some(i.id),
            Record::MarketingData(m) => m.id,
        }
    }

    /// The entity to remember for this record, if its kind is tracked.
    pub fn observed_entity(&self) -> Option<ObservedEntity> {
        match self {
            Record::Client(client) => Some(
                ObservedEntity::new(client.id, client.name.clone())
                    .with_niche(non_blank(&client.niche))
                    .with_contact_email(non_blank(&client.contact_email)),
            ),
            _ => None,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Render a loosely typed scalar the way the backend sent it (`1500`,
/// `"1500"`, `2.5`) without JSON quoting.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_from_backend_json() {
        let value = json!({
            "id": 7,
            "name": "Acme Inc",
            "niche": "technology",
            "contact_email": "",
            "created_at": "2025-01-01T00:00:00Z"
        });
        let record = Record::from_json(EntityKind::Client, value).unwrap();
        assert_eq!(record.kind(), EntityKind::Client);
        assert_eq!(record.id(), Some(7));

        let observed = record.observed_entity().unwrap();
        assert_eq!(observed.name, "Acme Inc");
        assert_eq!(observed.niche.as_deref(), Some("technology"));
        // Blank strings are not remembered as values.
        assert!(observed.contact_email.is_none());
    }

    #[test]
    fn test_campaign_camel_case_fields() {
        let value = json!({
            "id": 3,
            "name": "Spring Launch",
            "startDate": "2025-03-01",
            "targetAudience": "founders",
            "channels": ["email", "social"],
            "budget": 1500
        });
        let Record::Campaign(campaign) = Record::from_json(EntityKind::Campaign, value).unwrap() else {
            panic!("expected campaign");
        };
        assert_eq!(campaign.start_date.as_deref(), Some("2025-03-01"));
        assert_eq!(scalar_text(campaign.channels.as_ref().unwrap()).unwrap(), "email, social");
        assert_eq!(scalar_text(campaign.budget.as_ref().unwrap()).unwrap(), "1500");
    }

    #[test]
    fn test_only_clients_are_observed() {
        let value = json!({"id": 1, "title": "Ten tips", "type": "blog"});
        let record = Record::from_json(EntityKind::ContentIdea, value).unwrap();
        assert!(record.observed_entity().is_none());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let value = json!({"name": "No id"});
        assert!(Record::from_json(EntityKind::Client, value).is_err());
    }
}
