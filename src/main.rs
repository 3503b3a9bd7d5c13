//! statacquire - government statistical bulletin acquisition pipeline.
//!
//! A tool for discovering, downloading, and extracting press releases and
//! publications from government statistics portals.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use statacquire::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "statacquire=info"
    } else {
        "statacquire=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
