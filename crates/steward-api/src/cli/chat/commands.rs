//! Slash command parsing for the REPL.
//!
//! Commands start with `/`; anything else is sent to the router as a prompt.

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Exit,
    /// Start a fresh session.
    New,
    History,
    /// Show remembered clients.
    Entities,
    /// Forget this session's history and entities.
    Clear,
    Unknown(String),
}

/// Parse user input as a slash command. Returns `None` for ordinary prompts.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    Some(match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/new" => ChatCommand::New,
        "/history" => ChatCommand::History,
        "/entities" | "/clients" => ChatCommand::Entities,
        "/clear" => ChatCommand::Clear,
        other => ChatCommand::Unknown(other.to_string()),
    })
}

pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/history", "Show this session's conversation"),
        ("/entities", "Show remembered clients"),
        ("/clear", "Forget this session's memory"),
        ("/new", "Start a new session"),
        ("/exit", "Leave the REPL"),
    ];
    println!();
    println!("  {}", style("REPL commands:").bold());
    println!();
    for (cmd, desc) in rows {
        println!("  {:<10} {}", style(cmd).cyan(), desc);
    }
    println!();
    println!("  {}", style("Type \"help\" for the router's command catalogue.").dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("  /QUIT  "), Some(ChatCommand::Exit));
        assert_eq!(parse("/clients"), Some(ChatCommand::Entities));
        assert_eq!(parse("/history now"), Some(ChatCommand::History));
        assert_eq!(parse("/bogus"), Some(ChatCommand::Unknown("/bogus".into())));
    }

    #[test]
    fn test_plain_prompts_are_not_commands() {
        assert_eq!(parse("list clients"), None);
        assert_eq!(parse(""), None);
    }
}
