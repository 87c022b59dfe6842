//! CLI command definitions for the `steward` binary.

pub mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Route natural-language requests to a CRM backend.
#[derive(Parser)]
#[command(name = "steward", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Config file to load instead of the default location.
    #[arg(long, global = true, env = "STEWARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Interface to bind (defaults to the configured host).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port).
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run a single prompt and print the response.
    Ask {
        /// The request, e.g. "show client 3".
        prompt: String,

        /// Session id, to continue a conversation.
        #[arg(long, short)]
        session: Option<String>,
    },

    /// Interactive prompt loop over one session.
    Repl {
        /// Session id to start with (generated if omitted).
        #[arg(long, short)]
        session: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["steward", "serve", "--host", "127.0.0.1", "-p", "9000"]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(9000));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::parse_from(["steward", "ask", "list clients", "-s", "abc", "--json", "-vv"]);
        assert!(cli.json);
        assert!(!cli.otel);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { prompt, session } => {
                assert_eq!(prompt, "list clients");
                assert_eq!(session.as_deref(), Some("abc"));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_otel_flag_after_subcommand() {
        let cli = Cli::parse_from(["steward", "serve", "--otel"]);
        assert!(cli.otel);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
