//! The pattern library: every recognized command shape, in precedence order.
//!
//! Each [`PatternEntry`] pairs an intent with a case-insensitive regex that
//! must match the whole normalized prompt, plus a description of how its
//! named captures become a [`ParameterSet`]. The library is scanned linearly
//! by the resolver and the first match wins, so the order of [`PATTERNS`] is
//! externally observable behaviour: help first, then clients, campaigns,
//! content ideas, and marketing data, each in list/get/add/update/delete
//! order.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use steward_types::intent::{EntityKind, Intent, Operation};
use steward_types::params::{ParamValue, ParameterSet};

/// Markdown command catalogue returned for `help`.
pub const HELP_MESSAGE: &str = "### Available Commands

**Client Management:**
- `list clients` - Show all clients
- `add client named [name] with niche [industry] with email [email]` - Add a new client
- `tell me about client with id [ID]` - Get detailed client information
- `update client with id [ID] set [field] to [value]` - Update client information
- `delete client with id [ID]` - Remove a client

**Campaign Management:**
- `list campaigns` - Show all campaigns
- `add campaign named [name] for client [client] with budget [amount]` - Add a new campaign
- `tell me about campaign with id [ID]` - Get detailed campaign information
- `update campaign with id [ID] set [field] to [value]` - Update a campaign
- `delete campaign with id [ID]` - Remove a campaign

**Content Ideas:**
- `list ideas` - Show all content ideas
- `add idea titled [title] with type [type] for client [client]` - Add a new content idea
- `tell me about idea with id [ID]` - Get detailed content idea information
- `update idea with id [ID] set [field] to [value]` - Update a content idea
- `delete idea with id [ID]` - Remove a content idea

**Marketing Data:**
- `show marketing data` - Display marketing performance data
- `add marketing data for month [month] with revenue [amount] with spend [amount]` - Record a month

You can also refer to clients by their ID or name in follow-up questions, such as:
- \"What is the niche of client 5?\"
- \"Tell me the email for Acme Inc\"";

/// User-facing field words mapped to record field names.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("name", "name"),
    ("niche", "niche"),
    ("industry", "niche"),
    ("email", "contact_email"),
    ("contact email", "contact_email"),
    ("e-mail", "contact_email"),
    ("contact", "contact_person"),
    ("contact person", "contact_person"),
    ("notes", "notes"),
    ("note", "notes"),
    ("start", "startDate"),
    ("start date", "startDate"),
    ("end", "endDate"),
    ("end date", "endDate"),
    ("audience", "targetAudience"),
    ("target audience", "targetAudience"),
    ("channel", "channels"),
    ("channels", "channels"),
    ("format", "type"),
];

/// Fields that hold a list of values.
const LIST_FIELDS: &[&str] = &["channels"];

/// Resolve a user-facing field word to the record field it names.
///
/// Unknown words pass through lowercased with spaces replaced by `_`.
pub fn resolve_field_alias(word: &str) -> String {
    let normalized = word.trim().to_lowercase();
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, field)| (*field).to_string())
        .unwrap_or_else(|| normalized.replace(' ', "_"))
}

/// Normalize a prompt before matching: trim, collapse runs of whitespace,
/// and drop trailing sentence punctuation.
pub fn normalize(prompt: &str) -> String {
    let collapsed = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(['.', '!', '?'])
        .trim_end()
        .to_string()
}

/// How a pattern's captures become parameters.
#[derive(Debug, Clone, Copy)]
enum Extraction {
    /// Zero-parameter trigger.
    Nothing,
    /// Respond with the help catalogue.
    Help,
    /// A single `id` capture.
    Id,
    /// Named captures mapped to record fields: `(group, field)`.
    Fields(&'static [(&'static str, &'static str)]),
    /// `id` plus a `field`/`value` assignment resolved through the alias table.
    Assignment,
}

/// One entry in the pattern library.
pub struct PatternEntry {
    pub intent: Intent,
    regex: Regex,
    extraction: Extraction,
}

impl PatternEntry {
    fn new(intent: Intent, pattern: &str, extraction: Extraction) -> Self {
        let regex = Regex::new(&format!("(?i)^{pattern}$"))
            .unwrap_or_else(|e| panic!("invalid built-in pattern for {intent}: {e}"));
        Self {
            intent,
            regex,
            extraction,
        }
    }

    /// Match the whole normalized prompt and extract its parameters.
    pub fn try_match(&self, normalized_prompt: &str) -> Option<ParameterSet> {
        let caps = self.regex.captures(normalized_prompt)?;
        Some(self.extract(&caps))
    }

    fn extract(&self, caps: &Captures<'_>) -> ParameterSet {
        let mut params = ParameterSet::new();
        match self.extraction {
            Extraction::Nothing => {}
            Extraction::Help => params.insert("message", HELP_MESSAGE),
            Extraction::Id => params.insert_opt("id", capture(caps, "id")),
            Extraction::Fields(mapping) => {
                for (group, field) in mapping {
                    params.insert_opt(*field, capture(caps, group).map(|v| field_value(field, v)));
                }
            }
            Extraction::Assignment => {
                params.insert_opt("id", capture(caps, "id"));
                if let (Some(field), Some(value)) = (capture(caps, "field"), capture(caps, "value")) {
                    let field = resolve_field_alias(&field);
                    let value = field_value(&field, value);
                    params.insert(field, value);
                }
            }
        }
        params
    }
}

impl std::fmt::Debug for PatternEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternEntry")
            .field("intent", &self.intent.to_string())
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

/// A trimmed, non-empty capture.
fn capture(caps: &Captures<'_>, group: &str) -> Option<String> {
    caps.name(group)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn field_value(field: &str, raw: String) -> ParamValue {
    if LIST_FIELDS.contains(&field) {
        ParamValue::List(split_list(&raw))
    } else {
        ParamValue::Text(raw)
    }
}

/// Split "email, social and paid search" into its items.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .flat_map(|part| part.split(" and "))
        .map(|item| item.trim().trim_start_matches("and ").trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Pattern fragments
// ---------------------------------------------------------------------------

/// Verbs meaning "list".
const LIST_VERB: &str = r"(?:list|show|get|display|view)(?:\s+me)?(?:\s+all)?(?:\s+(?:the|my|our))?";

/// Verbs meaning "retrieve one record", with optional "details for" phrasing.
const GET_VERB: &str = r"(?:tell\s+me\s+about|tell\s+me|show\s+me|give\s+me|show|get|give|display|view|fetch|describe)(?:\s+(?:about|details\s+(?:for|about|on|of)|info(?:rmation)?\s+(?:for|about|on)))?(?:\s+the)?";

const ADD_VERB: &str = r"(?:add|create|new|register)(?:\s+(?:a|an))?(?:\s+new)?";

const UPDATE_VERB: &str = r"(?:update|change|modify|edit)(?:\s+the)?";

const DELETE_VERB: &str = r"(?:delete|remove)(?:\s+the)?";

/// "with id 42", "id 42", "#42", "number 42", or a bare "42".
const ID_REF: &str = r"(?:\s+with\s+id|\s+id|\s+number)?\s+#?(?P<id>[\w-]+)";

/// "set niche to finance", "change email as x@y.z".
const ASSIGNMENT: &str = r"\s+(?:set|change|update|make)\s+(?:the\s+|its\s+)?(?P<field>[a-z][\w -]*?)\s+(?:to|as|=)\s+(?P<value>.+)";

/// Optional "with <keyword> <value>" clause captured into `group`.
fn clause(keywords: &str, group: &str) -> String {
    format!(r"(?:,?\s+(?:with|and)\s+(?:the\s+|a\s+)?(?:{keywords})\s+(?:of\s+)?(?P<{group}>[^,]+?))?")
}

/// Optional "for client <name>" clause.
fn for_client_clause() -> String {
    r"(?:,?\s+for\s+(?:the\s+)?client\s+(?P<client>[^,]+?))?".to_string()
}

/// Optional trailing channels clause; the value may contain commas.
fn channels_clause() -> String {
    r"(?:,?\s+(?:with|and|on|via|using)\s+(?:the\s+)?channels?\s+(?P<channels>.+?))?".to_string()
}

struct Nouns {
    plural: &'static str,
    singular: &'static str,
}

fn nouns(kind: EntityKind) -> Nouns {
    match kind {
        EntityKind::Client => Nouns {
            plural: r"clients",
            singular: r"client",
        },
        EntityKind::Campaign => Nouns {
            plural: r"campaigns",
            singular: r"campaign",
        },
        EntityKind::ContentIdea => Nouns {
            plural: r"(?:content\s+)?ideas",
            singular: r"(?:content\s+)?idea",
        },
        EntityKind::MarketingData => Nouns {
            plural: r"(?:marketing\s+)?(?:data|performance|stats|statistics|analytics|metrics)",
            singular: r"marketing\s+(?:data\s+(?:entry|record|point)|entry|record|data)",
        },
    }
}

const CLIENT_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("niche", "niche"),
    ("contact_person", "contact_person"),
    ("email", "contact_email"),
    ("notes", "notes"),
];

const CAMPAIGN_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("client", "client"),
    ("status", "status"),
    ("budget", "budget"),
    ("start", "startDate"),
    ("end", "endDate"),
    ("audience", "targetAudience"),
    ("niche", "niche"),
    ("channels", "channels"),
];

const IDEA_FIELDS: &[(&str, &str)] = &[
    ("title", "title"),
    ("type", "type"),
    ("client", "client"),
    ("priority", "priority"),
    ("status", "status"),
    ("niche", "niche"),
];

const MARKETING_FIELDS: &[(&str, &str)] = &[
    ("month", "month"),
    ("revenue", "revenue"),
    ("spend", "spend"),
    ("roi", "roi"),
    ("client", "client"),
];

fn add_pattern(kind: EntityKind) -> (String, &'static [(&'static str, &'static str)]) {
    let singular = nouns(kind).singular;
    match kind {
        EntityKind::Client => (
            format!(
                r"{ADD_VERB}\s+{singular}(?:\s+(?:named|called|with\s+name))?\s+(?P<name>[^,]+?){}{}{}{}",
                clause(r"niche|industry", "niche"),
                clause(r"contact\s+person", "contact_person"),
                clause(r"contact\s+email|e-?mail|contact", "email"),
                clause(r"notes?", "notes"),
            ),
            CLIENT_FIELDS,
        ),
        EntityKind::Campaign => (
            format!(
                r"{ADD_VERB}\s+{singular}(?:\s+(?:named|called|with\s+name))?\s+(?P<name>[^,]+?){}{}{}{}{}{}{}{}",
                for_client_clause(),
                clause(r"status", "status"),
                clause(r"budget", "budget"),
                clause(r"start(?:\s+date)?", "start"),
                clause(r"end(?:\s+date)?", "end"),
                clause(r"(?:target\s+)?audience", "audience"),
                clause(r"niche", "niche"),
                channels_clause(),
            ),
            CAMPAIGN_FIELDS,
        ),
        EntityKind::ContentIdea => (
            format!(
                r"{ADD_VERB}\s+{singular}(?:\s+(?:titled|called|named|with\s+title))?\s+(?P<title>[^,]+?){}{}{}{}{}",
                clause(r"type|format", "type"),
                for_client_clause(),
                clause(r"priority", "priority"),
                clause(r"status", "status"),
                clause(r"niche", "niche"),
            ),
            IDEA_FIELDS,
        ),
        EntityKind::MarketingData => (
            format!(
                r"(?:{ADD_VERB}|record|log)\s+{singular}(?:\s+for\s+(?:the\s+)?month(?:\s+of)?\s+(?P<month>[^,]+?))?{}{}{}{}",
                clause(r"revenue", "revenue"),
                clause(r"spend|spending", "spend"),
                clause(r"roi", "roi"),
                for_client_clause(),
            ),
            MARKETING_FIELDS,
        ),
    }
}

fn entries_for(kind: EntityKind) -> Vec<PatternEntry> {
    let Nouns { plural, singular } = nouns(kind);
    Operation::ALL
        .iter()
        .map(|op| {
            let intent = Intent::backend(kind, *op);
            match op {
                Operation::List => {
                    PatternEntry::new(intent, &format!(r"{LIST_VERB}\s+{plural}"), Extraction::Nothing)
                }
                Operation::Get => PatternEntry::new(
                    intent,
                    &format!(r"{GET_VERB}\s+{singular}{ID_REF}"),
                    Extraction::Id,
                ),
                Operation::Add => {
                    let (pattern, fields) = add_pattern(kind);
                    PatternEntry::new(intent, &pattern, Extraction::Fields(fields))
                }
                Operation::Update => PatternEntry::new(
                    intent,
                    &format!(r"{UPDATE_VERB}\s+{singular}{ID_REF}{ASSIGNMENT}"),
                    Extraction::Assignment,
                ),
                Operation::Delete => PatternEntry::new(
                    intent,
                    &format!(r"{DELETE_VERB}\s+{singular}{ID_REF}"),
                    Extraction::Id,
                ),
            }
        })
        .collect()
}

/// The full library in precedence order.
pub static PATTERNS: LazyLock<Vec<PatternEntry>> = LazyLock::new(|| {
    let mut entries = vec![PatternEntry::new(
        Intent::Respond,
        r"(?:help|commands|what\s+can\s+you\s+do|how\s+to\s+use|how\s+do\s+i\s+use\s+this)",
        Extraction::Help,
    )];
    for kind in EntityKind::ALL {
        entries.extend(entries_for(kind));
    }
    entries
});

/// Scan the library and return the first matching intent with its
/// parameters. `normalized_prompt` must already be passed through
/// [`normalize`].
pub fn first_match(normalized_prompt: &str) -> Option<(Intent, ParameterSet)> {
    PATTERNS
        .iter()
        .find_map(|entry| entry.try_match(normalized_prompt).map(|params| (entry.intent, params)))
}
