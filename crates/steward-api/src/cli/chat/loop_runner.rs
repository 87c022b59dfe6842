//! Interactive prompt loop.
//!
//! Reads one prompt per line from stdin and runs it as a turn on a single
//! session until EOF or `/exit`.

use std::io::Write;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use steward_types::intent::EntityKind;
use steward_types::session::Role;

use super::commands::{self, ChatCommand};
use super::print_reply;
use crate::state::AppState;

pub async fn run_repl(state: &AppState, session: Option<String>, json: bool) -> anyhow::Result<()> {
    let mut session_id = session.unwrap_or_else(|| Uuid::new_v4().to_string());

    if !json {
        print_banner(state, &session_id);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !json {
            print!("  {} ", style("You >").green().bold());
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            if !json {
                println!("\n  {}", style("Session ended.").dim());
            }
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(input) {
            match cmd {
                ChatCommand::Exit => {
                    println!("  {}", style("Session ended.").dim());
                    break;
                }
                ChatCommand::Help => commands::print_help(),
                ChatCommand::New => {
                    session_id = Uuid::new_v4().to_string();
                    println!("\n  {} {}\n", style("New session:").bold(), style(&session_id).dim());
                }
                ChatCommand::History => print_history(state, &session_id),
                ChatCommand::Entities => print_entities(state, &session_id),
                ChatCommand::Clear => {
                    state.chat_service.clear_session(&session_id).await;
                    println!("\n  {}\n", style("Session memory cleared.").dim());
                }
                ChatCommand::Unknown(name) => println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                ),
            }
            continue;
        }

        match state.chat_service.handle(Some(session_id.clone()), input).await {
            Ok(reply) => print_reply(&reply, json)?,
            Err(e) => eprintln!("\n  {} {e}\n", style("!").red().bold()),
        }
    }

    Ok(())
}

fn print_banner(state: &AppState, session_id: &str) {
    println!();
    println!("  {}", style("Steward").cyan().bold());
    println!(
        "  {}  {}",
        style("Backend:").bold(),
        style(&state.config.backend.base_url).dim()
    );
    println!("  {}  {}", style("Session:").bold(), style(session_id).dim());
    println!();
    println!(
        "  {}",
        style("Type \"help\" for commands, /help for REPL controls, Ctrl+D to exit").dim()
    );
    println!();
}

fn print_history(state: &AppState, session_id: &str) {
    let history = state.memory.history(session_id, None);
    println!();
    if history.is_empty() {
        println!("  {}", style("No messages yet.").dim());
    }
    for interaction in history {
        let label = match interaction.role {
            Role::User => style("You").green(),
            Role::Assistant => style("Steward").cyan(),
        };
        let preview: String = interaction.content.lines().next().unwrap_or_default().chars().take(80).collect();
        println!("  {} {}", label.bold(), preview);
    }
    println!();
}

fn print_entities(state: &AppState, session_id: &str) {
    let clients = state.memory.recent_entities(session_id, EntityKind::Client, None);
    println!();
    if clients.is_empty() {
        println!("  {}", style("No clients remembered yet.").dim());
    }
    for client in clients {
        println!(
            "  {} {} {}",
            style(format!("#{}", client.id)).cyan(),
            style(&client.name).bold(),
            style(client.niche.as_deref().unwrap_or("")).dim()
        );
    }
    println!();
}
