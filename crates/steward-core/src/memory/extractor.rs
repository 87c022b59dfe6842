//! Recover client entities from rendered response text.
//!
//! `EntityExtractor` understands the three client renderings produced by
//! [`crate::dispatch::render`]:
//!
//! - the numbered `### Client List`,
//! - the `Successfully added client: **name** with ID: **7**` confirmation,
//! - the `### Client Details` card.
//!
//! The live path reports entities structurally from the dispatcher, so this
//! parser only runs over assistant text appended to memory directly and over
//! imported transcripts. Placeholder values such as "Not specified" are
//! treated as absent.

use std::sync::LazyLock;

use regex::Regex;

use steward_types::session::ObservedEntity;

pub const CLIENT_LIST_HEADER: &str = "### Client List";
pub const CLIENT_DETAILS_HEADER: &str = "### Client Details";
pub const CLIENT_ADDED_MARKER: &str = "Successfully added client:";

/// Rendered in place of a missing attribute.
pub const PLACEHOLDER: &str = "Not specified";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid extractor pattern {pattern:?}: {e}"))
}

static LIST_BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^\s*\d+\.\s+\*\*([^*\n]+)\*\*"));
static LIST_ID: LazyLock<Regex> = LazyLock::new(|| compile(r"-\s+ID:\s+(\d+)"));
static LIST_NICHE: LazyLock<Regex> = LazyLock::new(|| compile(r"-\s+Niche:[ \t]+([^\n]+)"));
static LIST_EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(r"-\s+Email:[ \t]+([^\n]+)"));

static ADDED: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"Successfully added client:\s+\*\*([^*]+)\*\*\s+with ID:\s+\*\*(\d+)\*\*")
});

static DETAIL_HEAD: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*([^*\n]+)\*\*\s+\(ID:\s+(\d+)\)"));
static DETAIL_NICHE: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*Niche:\*\*[ \t]+([^\n]+)"));
static DETAIL_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\*\*Contact Email:\*\*[ \t]+([^\n]+)"));

/// Stateless parser over rendered Markdown.
pub struct EntityExtractor;

impl EntityExtractor {
    /// Every client entity found in `content`, in order of appearance.
    pub fn extract_clients(content: &str) -> Vec<ObservedEntity> {
        let mut found = Vec::new();

        if let Some(section) = section_after(content, CLIENT_LIST_HEADER) {
            found.extend(list_entries(section));
        }

        if content.contains(CLIENT_ADDED_MARKER) {
            if let Some(caps) = ADDED.captures(content) {
                if let Ok(id) = caps[2].parse() {
                    found.push(ObservedEntity::new(id, caps[1].trim()));
                }
            }
        }

        if let Some(section) = section_after(content, CLIENT_DETAILS_HEADER) {
            found.extend(detail_entry(section));
        }

        found
    }
}

/// Text following `header` up to the next `### ` heading.
fn section_after<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)? + header.len();
    let rest = &content[start..];
    let end = rest.find("\n### ").unwrap_or(rest.len());
    Some(&rest[..end])
}

/// One entity per numbered block that carries an `- ID:` line. A block runs
/// to the next numbered block or the end of the section.
fn list_entries(section: &str) -> Vec<ObservedEntity> {
    let starts: Vec<_> = LIST_BLOCK_START.captures_iter(section).collect();
    let mut entities = Vec::with_capacity(starts.len());

    for (i, caps) in starts.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = starts
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(section.len(), |m| m.start());
        let block = &section[whole.end()..end];

        let Some(id) = first_capture(&LIST_ID, block).and_then(|s| s.parse().ok()) else {
            continue;
        };
        entities.push(
            ObservedEntity::new(id, name.as_str().trim())
                .with_niche(first_capture(&LIST_NICHE, block))
                .with_contact_email(first_capture(&LIST_EMAIL, block)),
        );
    }

    entities
}

fn detail_entry(section: &str) -> Option<ObservedEntity> {
    let caps = DETAIL_HEAD.captures(section)?;
    let id = caps[2].parse().ok()?;
    Some(
        ObservedEntity::new(id, caps[1].trim())
            .with_niche(first_capture(&DETAIL_NICHE, section))
            .with_contact_email(first_capture(&DETAIL_EMAIL, section)),
    )
}

/// First capture group of `re` in `text`, with placeholders filtered out.
fn first_capture(re: &Regex, text: &str) -> Option<String> {
    let value = re.captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() || value.eq_ignore_ascii_case(PLACEHOLDER) {
        None
    } else {
        Some(value.to_string())
    }
}
