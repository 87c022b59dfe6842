//! Intent resolution: prompt + session context -> (intent, parameters).
//!
//! Resolution runs three phases in strict order and the first success wins:
//!
//! 1. **Context shortcut** -- the prompt names a client remembered in this
//!    session (by name, or by a "client 7" / "id #7" reference). With an
//!    attribute keyword ("niche", "industry", "email", "contact") the answer
//!    comes straight from the cache as a `respond` intent; without one the
//!    prompt becomes `get_client` for that id.
//! 2. **Pattern** -- the first entry of the pattern library whose regex
//!    matches the whole normalized prompt.
//! 3. **Fallback** -- `unknown`, carrying a pointer to `help`.
//!
//! The shortcut only applies to questions. Prompts that open with a mutating
//! verb ("update client 7 set niche to ...") or that talk about another kind
//! of record ("list campaigns for client 7") go straight to the pattern
//! phase, otherwise a remembered client would hijack explicit commands.

use std::sync::LazyLock;

use regex::Regex;

use steward_types::intent::{EntityKind, Intent, Operation};
use steward_types::params::ParameterSet;
use steward_types::session::TrackedEntity;

use super::pattern::{first_match, normalize};

/// Message carried by the `unknown` intent.
pub const UNKNOWN_MESSAGE: &str = "I'm sorry, I don't understand that request. You can try:
- 'List clients'
- 'Add a new client named Acme Inc with niche technology'
- 'Update client with id 123 set name to Acme Technologies'
- 'Delete client with id 123'
- 'Tell me about client with id 123'
- Type 'help' to see all available commands";

/// Words that open a command changing backend state.
const MUTATING_VERBS: &[&str] = &[
    "add", "create", "new", "register", "record", "log", "update", "change", "modify", "edit",
    "set", "delete", "remove",
];

/// Nouns of the kinds the shortcut does not cover.
const OTHER_KIND_NOUNS: &[&str] = &["campaign", "idea", "marketing"];

const NICHE_KEYWORDS: &[&str] = &["niche", "industry"];
const EMAIL_KEYWORDS: &[&str] = &["email", "contact"];

static ID_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:client|id)\s+(?:#|number\s+)?(\d+)\b")
        .unwrap_or_else(|e| panic!("invalid id reference pattern: {e}"))
});

/// Which phase produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPhase {
    ContextShortcut,
    Pattern,
    Fallback,
}

/// The resolver's decision for one prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub intent: Intent,
    pub params: ParameterSet,
    pub phase: ResolutionPhase,
}

impl Resolution {
    fn respond(message: String) -> Self {
        Self {
            intent: Intent::Respond,
            params: ParameterSet::new().with("message", message),
            phase: ResolutionPhase::ContextShortcut,
        }
    }

    fn client_details(id: i64) -> Self {
        Self {
            intent: Intent::backend(EntityKind::Client, Operation::Get),
            params: ParameterSet::new().with("id", id.to_string()),
            phase: ResolutionPhase::ContextShortcut,
        }
    }

    fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            params: ParameterSet::new().with("message", UNKNOWN_MESSAGE),
            phase: ResolutionPhase::Fallback,
        }
    }

    /// The carried message of a `respond`/`unknown` resolution.
    pub fn message(&self) -> Option<&str> {
        self.params.text("message")
    }
}

/// A user's answer to a pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationReply {
    Confirm,
    Cancel,
}

/// Classify a prompt as a reply to a confirmation question, if it is one.
pub fn confirmation_reply(prompt: &str) -> Option<ConfirmationReply> {
    match normalize(prompt).to_lowercase().as_str() {
        "yes" | "y" | "confirm" | "yes please" | "do it" | "go ahead" | "ok" | "okay" => {
            Some(ConfirmationReply::Confirm)
        }
        "no" | "n" | "cancel" | "abort" | "stop" | "never mind" | "nevermind" => {
            Some(ConfirmationReply::Cancel)
        }
        _ => None,
    }
}

/// Stateless resolver over the pattern library and a read-only view of the
/// session's tracked clients.
pub struct IntentResolver;

impl IntentResolver {
    /// Resolve `prompt` against the session's tracked clients.
    ///
    /// `tracked_clients` should be ordered most recently mentioned first;
    /// on equal-length name matches the earlier entity wins.
    #[tracing::instrument(name = "resolve_intent", skip(tracked_clients), fields(tracked = tracked_clients.len()))]
    pub fn resolve(prompt: &str, tracked_clients: &[TrackedEntity]) -> Resolution {
        let normalized = normalize(prompt);
        if normalized.is_empty() {
            return Resolution::unknown();
        }

        let lower = normalized.to_lowercase();
        if shortcut_applies(&lower) {
            if let Some(resolution) = context_shortcut(&lower, tracked_clients) {
                tracing::debug!(intent = %resolution.intent, "Resolved from session context");
                return resolution;
            }
        }

        if let Some((intent, params)) = first_match(&normalized) {
            tracing::debug!(intent = %intent, params = params.len(), "Resolved from pattern library");
            return Resolution {
                intent,
                params,
                phase: ResolutionPhase::Pattern,
            };
        }

        tracing::warn!(prompt = %normalized, "No matching intent for prompt");
        Resolution::unknown()
    }
}

fn shortcut_applies(lower: &str) -> bool {
    let first_word = lower.split_whitespace().next().unwrap_or_default();
    if MUTATING_VERBS.contains(&first_word) {
        return false;
    }
    !OTHER_KIND_NOUNS.iter().any(|noun| lower.contains(noun))
}

fn context_shortcut(lower: &str, clients: &[TrackedEntity]) -> Option<Resolution> {
    if let Some(client) = match_by_name(lower, clients) {
        return Some(answer(lower, client, &client.name));
    }

    let id: i64 = ID_REFERENCE.captures(lower)?.get(1)?.as_str().parse().ok()?;
    let client = clients.iter().find(|c| c.id == id)?;
    Some(answer(lower, client, &format!("client #{} ({})", client.id, client.name)))
}

/// The tracked client whose name appears in the prompt. Longer names win so
/// "Acme Inc" is preferred over "Acme" when both are remembered.
fn match_by_name<'a>(lower: &str, clients: &'a [TrackedEntity]) -> Option<&'a TrackedEntity> {
    let mut best: Option<(&TrackedEntity, usize)> = None;
    for client in clients {
        let name = client.name.trim().to_lowercase();
        if name.is_empty() || !lower.contains(&name) {
            continue;
        }
        if best.is_none_or(|(_, len)| name.len() > len) {
            best = Some((client, name.len()));
        }
    }
    best.map(|(client, _)| client)
}

/// Answer from the cache when the asked-for attribute is known; otherwise
/// fetch the client's details from the backend.
fn answer(lower: &str, client: &TrackedEntity, subject: &str) -> Resolution {
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if mentions(NICHE_KEYWORDS) {
        if let Some(niche) = &client.niche {
            return Resolution::respond(format!("The niche for {subject} is: {niche}"));
        }
    } else if mentions(EMAIL_KEYWORDS) {
        if let Some(email) = &client.contact_email {
            return Resolution::respond(format!("The contact email for {subject} is: {email}"));
        }
    }

    Resolution::client_details(client.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn tracked(id: i64, name: &str, niche: Option<&str>, email: Option<&str>) -> TrackedEntity {
        TrackedEntity {
            id,
            name: name.to_string(),
            niche: niche.map(str::to_string),
            contact_email: email.map(str::to_string),
            last_mentioned: Utc::now(),
        }
    }

    fn acme() -> Vec<TrackedEntity> {
        vec![tracked(7, "Acme Inc", Some("technology"), Some("hello@acme.com"))]
    }

    #[test]
    fn test_empty_prompt_is_unknown() {
        let resolution = IntentResolver::resolve("   ", &acme());
        assert_eq!(resolution.intent, Intent::Unknown);
        assert_eq!(resolution.phase, ResolutionPhase::Fallback);
    }

    #[test]
    fn test_unknown_regardless_of_session_state() {
        for clients in [Vec::new(), acme()] {
            let resolution = IntentResolver::resolve("what is the weather today?", &clients);
            assert_eq!(resolution.intent, Intent::Unknown);
            assert!(resolution.message().unwrap().contains("help"));
        }
    }

    #[test]
    fn test_niche_by_name_from_cache() {
        let resolution = IntentResolver::resolve("what is the niche of Acme Inc", &acme());
        assert_eq!(resolution.intent, Intent::Respond);
        assert_eq!(resolution.phase, ResolutionPhase::ContextShortcut);
        assert_eq!(resolution.message(), Some("The niche for Acme Inc is: technology"));
    }

    #[test]
    fn test_email_by_id_reference() {
        let resolution = IntentResolver::resolve("Tell me the email for client #7", &acme());
        assert_eq!(resolution.intent, Intent::Respond);
        assert_eq!(
            resolution.message(),
            Some("The contact email for client #7 (Acme Inc) is: hello@acme.com")
        );
    }

    #[test]
    fn test_reference_without_attribute_fetches_details() {
        let resolution = IntentResolver::resolve("what about acme inc", &acme());
        assert_eq!(resolution.intent, Intent::backend(EntityKind::Client, Operation::Get));
        assert_eq!(resolution.params.text("id"), Some("7"));
    }

    #[test]
    fn test_unknown_cached_attribute_fetches_details() {
        let clients = vec![tracked(9, "Globex", None, None)];
        let resolution = IntentResolver::resolve("what industry is Globex in", &clients);
        assert_eq!(resolution.intent, Intent::backend(EntityKind::Client, Operation::Get));
        assert_eq!(resolution.params.text("id"), Some("9"));
    }

    #[test]
    fn test_untracked_id_is_not_a_shortcut() {
        let resolution = IntentResolver::resolve("what is the niche of client 5", &acme());
        assert_eq!(resolution.intent, Intent::Unknown);
    }

    #[test]
    fn test_mutating_commands_skip_shortcut() {
        let resolution = IntentResolver::resolve("update client with id 7 set niche to finance", &acme());
        assert_eq!(resolution.intent, Intent::backend(EntityKind::Client, Operation::Update));
        assert_eq!(resolution.phase, ResolutionPhase::Pattern);
        assert_eq!(resolution.params.text("niche"), Some("finance"));

        let resolution = IntentResolver::resolve("delete client with id 7", &acme());
        assert_eq!(resolution.intent, Intent::backend(EntityKind::Client, Operation::Delete));
    }

    #[test]
    fn test_other_kinds_skip_shortcut() {
        let resolution = IntentResolver::resolve("show campaign 7", &acme());
        assert_eq!(resolution.intent, Intent::backend(EntityKind::Campaign, Operation::Get));
    }

    #[test]
    fn test_longest_name_wins() {
        let mut clients = vec![tracked(1, "Acme", Some("retail"), None)];
        clients.push(tracked(2, "Acme Labs", Some("biotech"), None));
        let resolution = IntentResolver::resolve("niche of acme labs?", &clients);
        assert_eq!(resolution.message(), Some("The niche for Acme Labs is: biotech"));
    }

    #[test]
    fn test_equal_names_prefer_first() {
        let mut older = tracked(1, "Initech", Some("software"), None);
        older.last_mentioned = Utc::now() - Duration::minutes(5);
        let newer = tracked(2, "Initech", Some("consulting"), None);
        let resolution = IntentResolver::resolve("initech niche", &[newer, older]);
        assert_eq!(resolution.message(), Some("The niche for Initech is: consulting"));
    }

    #[test]
    fn test_pattern_phase_without_context() {
        let resolution = IntentResolver::resolve("show all clients", &[]);
        assert_eq!(resolution.intent, Intent::backend(EntityKind::Client, Operation::List));
        assert!(resolution.params.is_empty());
        assert_eq!(resolution.phase, ResolutionPhase::Pattern);
    }

    #[test]
    fn test_confirmation_reply() {
        assert_eq!(confirmation_reply("Yes!"), Some(ConfirmationReply::Confirm));
        assert_eq!(confirmation_reply(" cancel "), Some(ConfirmationReply::Cancel));
        assert_eq!(confirmation_reply("list clients"), None);
    }
}
