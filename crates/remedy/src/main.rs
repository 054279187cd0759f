//! Remedy CLI binary.

use anyhow::Result;
use remedy::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the remedy CLI.
///
/// Uses tokio's current_thread runtime: remedy's work is sequential
/// subprocess orchestration, with concurrency only inside the scanner.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Can be controlled via the RUST_LOG environment variable;
    // --verbose raises the default level.
    let default_filter = if cli.verbose {
        "remedy=debug,remedy_store=debug"
    } else {
        "remedy=info,remedy_store=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    cli.execute().await
}
