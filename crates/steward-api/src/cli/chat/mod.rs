//! Conversational commands: one-shot `ask` and the interactive `repl`.

pub mod commands;
pub mod loop_runner;

use console::style;

use steward_core::chat::ChatReply;
use steward_types::intent::Intent;

use crate::state::AppState;

/// Run one turn and print the reply.
pub async fn ask(
    state: &AppState,
    prompt: &str,
    session: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let reply = state.chat_service.handle(session, prompt).await?;
    print_reply(&reply, json)?;
    Ok(())
}

/// Print a reply either as JSON or as styled text.
pub fn print_reply(reply: &ChatReply, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
        return Ok(());
    }

    let marker = match reply.intent {
        Intent::Error => style("!").red().bold(),
        Intent::Unknown => style("?").yellow().bold(),
        _ => style("*").cyan().bold(),
    };
    println!();
    println!("  {} {}", marker, style(reply.intent.to_string()).dim());
    println!();
    for line in reply.response.lines() {
        println!("  {line}");
    }
    println!();
    Ok(())
}
