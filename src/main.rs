use matchmaking_client::frameworks::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Delegate to the command-line entry point.
    cli::run().await
}
