use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::domain::MatchmakingError;
use crate::frameworks::{client, config};

#[derive(Parser, Debug)]
#[command(name = "matchmaking_client")]
#[command(about = "Queue for a game session through the matchmaking frontend")]
#[command(version)]
pub struct Cli {
    /// Frontend endpoint as host:port or https URL (defaults to OM_FRONTEND_ENDPOINT)
    #[arg(long, global = true, value_name = "ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a ticket and print the assigned connection string
    Assign {
        #[arg(long)]
        room: String,
        #[arg(long)]
        region: String,
        /// Leave the ticket on the frontend when interrupted or timed out
        #[arg(long)]
        keep_ticket: bool,
    },
    /// Delete an outstanding ticket
    Delete { ticket_id: String },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr; stdout carries only the command result.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    let endpoint = cli.endpoint.unwrap_or_else(config::frontend_endpoint);
    tracing::debug!(%endpoint, "matchmaking frontend configured.");

    let result = match cli.command {
        Command::Assign {
            room,
            region,
            keep_ticket,
        } => assign(&endpoint, &room, &region, keep_ticket).await,
        Command::Delete { ticket_id } => client::delete_ticket(&endpoint, &ticket_id)
            .await
            .map(|()| {
                println!("{ticket_id}");
                Finished::Done
            }),
    };

    match result {
        Ok(Finished::Done) => ExitCode::SUCCESS,
        Ok(Finished::Interrupted) => ExitCode::from(130),
        Err(e) => {
            tracing::error!(error = %e, setup_failure = e.is_setup_failure(), "command failed.");
            ExitCode::FAILURE
        }
    }
}

enum Finished {
    Done,
    Interrupted,
}

async fn assign(
    endpoint: &str,
    room: &str,
    region: &str,
    keep_ticket: bool,
) -> Result<Finished, MatchmakingError> {
    let use_case = client::assignment_use_case();
    let pending = use_case.submit(endpoint, room, region).await?;
    let ticket_id = pending.ticket_id().to_string();

    // Dropping the wait on Ctrl-C releases its connection before the ticket is withdrawn.
    let waited = tokio::select! {
        outcome = pending.wait_for_assignment(&use_case.policy) => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };

    match waited {
        Some(Ok(outcome)) => {
            println!("{}", outcome.connection);
            Ok(Finished::Done)
        }
        Some(Err(e)) => {
            if let Some(ticket_id) = e.outstanding_ticket() {
                withdraw(endpoint, ticket_id, keep_ticket).await;
            }
            Err(e)
        }
        None => {
            tracing::warn!(%ticket_id, "interrupted while waiting for assignment.");
            withdraw(endpoint, &ticket_id, keep_ticket).await;
            Ok(Finished::Interrupted)
        }
    }
}

// Best effort: a failed delete is logged, the original outcome still decides the exit code.
async fn withdraw(endpoint: &str, ticket_id: &str, keep_ticket: bool) {
    if keep_ticket {
        tracing::info!(%ticket_id, "leaving ticket in place.");
        return;
    }
    if let Err(e) = client::delete_ticket(endpoint, ticket_id).await {
        tracing::warn!(error = %e, %ticket_id, "failed to withdraw ticket.");
    }
}
