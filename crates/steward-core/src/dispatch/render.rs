//! Markdown rendering of backend results.
//!
//! The client templates are load-bearing: [`crate::memory::extractor`] parses
//! them back into entities, so the list block layout, the "Successfully added
//! client" sentence, and the details card must stay in step with it.

use std::fmt::Write;

use serde_json::Value;

use steward_types::error::BackendError;
use steward_types::intent::EntityKind;
use steward_types::record::{Campaign, Client, ContentIdea, MarketingData, Record, scalar_text};

use crate::memory::extractor::PLACEHOLDER;

/// Title-case noun used in headings.
pub fn title(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Client => "Client",
        EntityKind::Campaign => "Campaign",
        EntityKind::ContentIdea => "Content Idea",
        EntityKind::MarketingData => "Marketing Data",
    }
}

fn or_placeholder(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(PLACEHOLDER)
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

fn value_text(value: &Option<Value>) -> Option<String> {
    value.as_ref().and_then(scalar_text)
}

fn suggestions(out: &mut String, items: &[&str]) {
    out.push_str("\n\n---\n\n**What would you like to do next?**\n");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

/// Numbered list of `records`, or the kind's empty message.
pub fn render_list(kind: EntityKind, records: &[Record]) -> String {
    if records.is_empty() {
        return match kind {
            EntityKind::Client => "No clients found.".to_string(),
            EntityKind::Campaign => "No campaigns found.".to_string(),
            EntityKind::ContentIdea => "No content ideas found.".to_string(),
            EntityKind::MarketingData => "No marketing data available.".to_string(),
        };
    }

    if kind == EntityKind::MarketingData {
        let mut out = String::from("### Marketing Performance Data\n\n");
        marketing_table(&mut out, records.iter().filter_map(as_marketing));
        suggestions(&mut out, &["List campaigns", "List content ideas", "List clients"]);
        return out;
    }

    let mut out = match kind {
        EntityKind::ContentIdea => String::from("### Content Ideas List\n"),
        _ => format!("### {} List\n", title(kind)),
    };
    for (n, record) in records.iter().enumerate() {
        match record {
            Record::Client(c) => client_list_item(&mut out, n + 1, c),
            Record::Campaign(c) => campaign_list_item(&mut out, n + 1, c),
            Record::ContentIdea(i) => idea_list_item(&mut out, n + 1, i),
            Record::MarketingData(_) => {}
        }
    }

    let next: &[&str] = match kind {
        EntityKind::Client => &[
            "Add a new client",
            "Get details about a specific client",
            "Update a client's information",
            "List campaigns",
        ],
        EntityKind::Campaign => &[
            "Add a new campaign",
            "Get details about a specific campaign",
            "List content ideas",
        ],
        _ => &[
            "Add a new content idea",
            "Get details about a specific idea",
            "List campaigns",
        ],
    };
    suggestions(&mut out, next);
    out
}

fn client_list_item(out: &mut String, n: usize, client: &Client) {
    let _ = writeln!(out, "{n}. **{}**", client.name);
    let _ = writeln!(out, "   - ID: {}", client.id);
    let _ = writeln!(out, "   - Niche: {}", or_placeholder(client.niche.as_deref()));
    if let Some(person) = client.contact_person.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "   - Contact: {person}");
    }
    if let Some(email) = client.contact_email.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "   - Email: {email}");
    }
}

fn campaign_list_item(out: &mut String, n: usize, campaign: &Campaign) {
    let _ = writeln!(out, "{n}. **{}**", campaign.name);
    let _ = writeln!(out, "   - ID: {}", campaign.id);
    let _ = writeln!(out, "   - Status: {}", or_placeholder(campaign.status.as_deref()));
    let _ = writeln!(out, "   - Client: {}", or_placeholder(campaign.client.as_deref()));
    if let Some(budget) = value_text(&campaign.budget) {
        let _ = writeln!(out, "   - Budget: {budget}");
    }
    if let Some(start) = campaign.start_date.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   - Start Date: {start}");
    }
    if let Some(end) = campaign.end_date.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   - End Date: {end}");
    }
}

fn idea_list_item(out: &mut String, n: usize, idea: &ContentIdea) {
    let _ = writeln!(out, "{n}. **{}**", idea.title);
    let _ = writeln!(out, "   - ID: {}", idea.id);
    let _ = writeln!(out, "   - Type: {}", or_placeholder(idea.content_type.as_deref()));
    let _ = writeln!(out, "   - Status: {}", or_default(idea.status.as_deref(), "New"));
    let _ = writeln!(out, "   - Priority: {}", or_default(idea.priority.as_deref(), "Medium"));
    if let Some(client) = idea.client.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   - Client: {client}");
    }
}

fn as_marketing(record: &Record) -> Option<&MarketingData> {
    match record {
        Record::MarketingData(m) => Some(m),
        _ => None,
    }
}

fn marketing_table<'a>(out: &mut String, rows: impl Iterator<Item = &'a MarketingData>) {
    out.push_str("| Month | Revenue | Spend | ROI | Client |\n");
    out.push_str("|-------|---------|-------|-----|--------|\n");
    for row in rows {
        let money = |v: &Option<Value>| value_text(v).map_or_else(|| "-".to_string(), |s| format!("${s}"));
        let roi = value_text(&row.roi).map_or_else(|| "-".to_string(), |s| format!("{s}x"));
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            or_default(row.month.as_deref(), "-"),
            money(&row.revenue),
            money(&row.spend),
            roi,
            or_default(row.client.as_deref(), "-"),
        );
    }
}

/// Detail card for a single record.
pub fn render_details(record: &Record) -> String {
    let mut out = format!("### {} Details\n\n", title(record.kind()));
    match record {
        Record::Client(c) => {
            let _ = writeln!(out, "**{}** (ID: {})\n", c.name, c.id);
            let _ = writeln!(out, "- **Niche:** {}", or_placeholder(c.niche.as_deref()));
            let _ = writeln!(out, "- **Contact Person:** {}", or_placeholder(c.contact_person.as_deref()));
            let _ = writeln!(out, "- **Contact Email:** {}", or_placeholder(c.contact_email.as_deref()));
            let _ = writeln!(out, "- **Notes:** {}", or_default(c.notes.as_deref(), "None"));
            if let Some(industry) = c.industry.as_deref().filter(|s| !s.is_empty()) {
                let _ = writeln!(out, "- **Industry:** {industry}");
            }
            if let Some(satisfaction) = value_text(&c.satisfaction) {
                let _ = writeln!(out, "- **Satisfaction:** {satisfaction}");
            }
            if let Some(tier) = c.tier.as_deref().filter(|s| !s.is_empty()) {
                let _ = writeln!(out, "- **Tier:** {tier}");
            }
            if let Some(created) = &c.created_at {
                let _ = write!(out, "\n*Created: {created}*");
            }
            if let Some(updated) = &c.updated_at {
                let _ = write!(out, "\n*Last Updated: {updated}*");
            }
            suggestions(
                &mut out,
                &[
                    "Update this client's information",
                    "Delete this client",
                    "List all clients",
                    "Add a campaign for this client",
                ],
            );
        }
        Record::Campaign(c) => {
            let _ = writeln!(out, "**{}** (ID: {})\n", c.name, c.id);
            let _ = writeln!(out, "- **Status:** {}", or_placeholder(c.status.as_deref()));
            let _ = writeln!(out, "- **Client:** {}", or_placeholder(c.client.as_deref()));
            let budget = value_text(&c.budget);
            let _ = writeln!(out, "- **Budget:** {}", or_placeholder(budget.as_deref()));
            let _ = writeln!(out, "- **Start Date:** {}", or_placeholder(c.start_date.as_deref()));
            let _ = writeln!(out, "- **End Date:** {}", or_placeholder(c.end_date.as_deref()));
            let _ = writeln!(
                out,
                "- **Target Audience:** {}",
                or_placeholder(c.target_audience.as_deref())
            );
            if let Some(channels) = value_text(&c.channels) {
                let _ = writeln!(out, "- **Channels:** {channels}");
            }
            suggestions(
                &mut out,
                &[
                    "List all campaigns",
                    "Add content ideas for this campaign",
                    "View marketing data",
                ],
            );
        }
        Record::ContentIdea(i) => {
            let _ = writeln!(out, "**{}** (ID: {})\n", i.title, i.id);
            let _ = writeln!(out, "- **Type:** {}", or_placeholder(i.content_type.as_deref()));
            let _ = writeln!(out, "- **Status:** {}", or_default(i.status.as_deref(), "New"));
            let _ = writeln!(out, "- **Priority:** {}", or_default(i.priority.as_deref(), "Medium"));
            let _ = writeln!(out, "- **Client:** {}", or_placeholder(i.client.as_deref()));
            suggestions(&mut out, &["List all content ideas", "Add another content idea"]);
        }
        Record::MarketingData(m) => {
            marketing_table(&mut out, std::iter::once(m));
            suggestions(&mut out, &["View all marketing data", "List campaigns"]);
        }
    }
    out
}

/// Confirmation for a created record.
pub fn render_created(record: &Record) -> String {
    let kind = record.kind();
    let id = record.id().map_or_else(|| "unknown".to_string(), |id| id.to_string());
    let mut out = match record {
        Record::Client(c) => format!(
            "### Client Added\nSuccessfully added client: **{}** with ID: **{id}**",
            c.name
        ),
        Record::Campaign(c) => format!(
            "### Campaign Added\nSuccessfully added campaign: **{}** with ID: **{id}**",
            c.name
        ),
        Record::ContentIdea(i) => format!(
            "### Content Idea Added\nSuccessfully added content idea: **{}** with ID: **{id}**",
            i.title
        ),
        Record::MarketingData(m) => format!(
            "### Marketing Data Added\nSuccessfully added marketing data for **{}** with ID: **{id}**",
            or_default(m.month.as_deref(), "the month")
        ),
    };
    let next: &[&str] = match kind {
        EntityKind::Client => &[
            "Add another client",
            "Update this client's information",
            "List all clients",
            "Add a campaign for this client",
        ],
        EntityKind::Campaign => &[
            "Add another campaign",
            "Add content ideas for this campaign",
            "List all campaigns",
        ],
        EntityKind::ContentIdea => &[
            "Add another content idea",
            "List all content ideas",
            "View marketing data",
        ],
        EntityKind::MarketingData => &["View all marketing data", "List campaigns"],
    };
    suggestions(&mut out, next);
    out
}

pub fn render_updated(kind: EntityKind) -> String {
    format!(
        "{} updated successfully! The changes have been applied to the {} record.",
        title(kind),
        kind.label()
    )
}

pub fn render_deleted(kind: EntityKind) -> String {
    format!(
        "{} deleted successfully. The {} has been removed from the database.",
        title(kind),
        kind.label()
    )
}

pub fn render_not_found(kind: EntityKind, id: &str) -> String {
    format!(
        "I couldn't find a {} with ID {id}. Please check the ID and try again.",
        kind.label()
    )
}

pub fn render_missing_id(kind: EntityKind) -> String {
    format!("Please tell me which {} you mean by its ID.", kind.label())
}

pub fn render_missing_fields(kind: EntityKind, id: &str) -> String {
    format!(
        "Tell me what to change on {} {id}, for example 'set name to ...'.",
        kind.label()
    )
}

/// Short apology for a failed backend call. Full detail goes to the log.
pub fn render_error(err: &BackendError) -> String {
    format!("Sorry, I encountered an error: {err}")
}

pub fn render_confirm_delete(kind: EntityKind, id: &str) -> String {
    format!(
        "Are you sure you want to delete {} {id}? This cannot be undone.\n\nReply **yes** to confirm or **no** to cancel.",
        kind.label()
    )
}

pub fn render_cancelled(kind: EntityKind, id: &str) -> String {
    format!("Okay, {} {id} was not deleted.", kind.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::EntityExtractor;
    use serde_json::json;

    fn client(value: Value) -> Record {
        Record::from_json(EntityKind::Client, value).unwrap()
    }

    #[test]
    fn test_client_list_round_trips_through_extractor() {
        let records = vec![
            client(json!({"id": 7, "name": "Acme Inc", "niche": "technology", "contact_email": "hello@acme.com"})),
            client(json!({"id": 9, "name": "Globex", "contact_person": "Hank"})),
        ];
        let text = render_list(EntityKind::Client, &records);
        assert!(text.starts_with("### Client List\n1. **Acme Inc**\n   - ID: 7\n   - Niche: technology\n"));
        assert!(text.contains("   - Contact: Hank\n"));
        assert!(text.contains("**What would you like to do next?**"));

        let extracted = EntityExtractor::extract_clients(&text);
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].contact_email.as_deref(), Some("hello@acme.com"));
        assert_eq!(extracted[1].niche, None);
    }

    #[test]
    fn test_client_details_round_trips_through_extractor() {
        let text = render_details(&client(json!({"id": 7, "name": "Acme Inc", "niche": "technology"})));
        assert!(text.contains("**Acme Inc** (ID: 7)"));
        assert!(text.contains("- **Contact Email:** Not specified"));
        let extracted = EntityExtractor::extract_clients(&text);
        assert_eq!(extracted[0].niche.as_deref(), Some("technology"));
        assert_eq!(extracted[0].contact_email, None);
    }

    #[test]
    fn test_created_client_message() {
        let text = render_created(&client(json!({"id": 12, "name": "Initech"})));
        assert!(text.starts_with(
            "### Client Added\nSuccessfully added client: **Initech** with ID: **12**"
        ));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(render_list(EntityKind::Client, &[]), "No clients found.");
        assert_eq!(render_list(EntityKind::MarketingData, &[]), "No marketing data available.");
    }

    #[test]
    fn test_marketing_table() {
        let rows = vec![
            Record::from_json(
                EntityKind::MarketingData,
                json!({"month": "March", "revenue": 12000, "spend": "3000", "roi": 4, "client": "Acme"}),
            )
            .unwrap(),
        ];
        let text = render_list(EntityKind::MarketingData, &rows);
        assert!(text.contains("| March | $12000 | $3000 | 4x | Acme |"));
    }

    #[test]
    fn test_campaign_details_joins_channels() {
        let record = Record::from_json(
            EntityKind::Campaign,
            json!({"id": 3, "name": "Spring Sale", "channels": ["email", "social"]}),
        )
        .unwrap();
        let text = render_details(&record);
        assert!(text.starts_with("### Campaign Details\n\n**Spring Sale** (ID: 3)\n"));
        assert!(text.contains("- **Channels:** email, social\n"));
        assert!(text.contains("- **Budget:** Not specified\n"));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            render_not_found(EntityKind::ContentIdea, "42"),
            "I couldn't find a content idea with ID 42. Please check the ID and try again."
        );
    }
}
