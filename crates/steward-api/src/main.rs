//! Steward CLI and REST API entry point.

mod cli;
mod http;
mod state;

use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use steward_infra::config::{default_config_path, load_config, load_config_strict};
use steward_observe::tracing_setup::{TracingOptions, directive_for, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        json: cli.json,
        otel: cli.otel,
        default_directive: directive_for(cli.verbose, cli.quiet).to_string(),
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // An explicitly named file must load; the default location may be absent.
    let config = match &cli.config {
        Some(path) => load_config_strict(path).await?,
        None => load_config(&default_config_path()).await,
    };

    let state = AppState::init(config)?;

    let result = run(cli, state).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Ask { prompt, session } => {
            cli::chat::ask(&state, &prompt, session, cli.json).await?;
        }

        Commands::Repl { session } => {
            cli::chat::loop_runner::run_repl(&state, session, cli.json).await?;
        }

        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Steward listening on {}",
                    console::style(">").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {} {}",
                    console::style("Backend:").dim(),
                    console::style(&state.config.backend.base_url).dim()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let cancel = CancellationToken::new();
            let purge_task = spawn_purge_task(state.clone(), cancel.clone());

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            cancel.cancel();
            if let Err(e) = purge_task.await {
                tracing::warn!("Purge task ended abnormally: {e}");
            }

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }
    }

    Ok(())
}

/// Sweep expired sessions every `purge_interval_secs` until cancelled.
fn spawn_purge_task(state: AppState, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_secs(state.config.memory.purge_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let purged = state.chat_service.purge_expired();
                    tracing::debug!(purged, "Session purge sweep");
                }
            }
        }
    })
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
