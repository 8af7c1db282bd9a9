//! GeoNorge Fetcher CLI application
//!
//! Command-line interface for ordering and downloading datasets from the
//! GeoNorge download service, with cached credentials and bearer tokens.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// Import CLI modules through the library (module is public but not re-exported)
use geonorge_fetcher::auth::{CredentialStore, TokenStore};
use geonorge_fetcher::cli::{self, Cli};
use geonorge_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    // Initialize program
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok(); // Ignore errors if file doesn't exist

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(&cli);

    info!("GeoNorge Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    let credential_store = CredentialStore::new()?;
    let token_store = TokenStore::new()?;
    let auth_relevant = cli::is_auth_relevant(&cli.command);

    let result = cli::run(cli, &credential_store, &token_store).await;

    // A 401 on a command that uses the saved credentials means they are
    // stale; wipe both stores so the next run starts clean.
    if let Err(error) = &result {
        if auth_relevant && error.is_unauthorized() {
            clear_auth_state(&credential_store, &token_store)?;
            eprintln!("Authentication failed (401). Saved credentials were cleared.");
            eprintln!("Run again to re-enter them, or set GEONORGE_USERNAME / GEONORGE_PASSWORD.");
        }
    }

    result
}

/// Remove both the credential and token cache files
fn clear_auth_state(
    credential_store: &CredentialStore,
    token_store: &TokenStore,
) -> Result<()> {
    credential_store.clear()?;
    token_store.clear()?;
    info!("Cleared stored credentials and bearer token");
    Ok(())
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    // Create environment filter
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("geonorge_fetcher={}", log_level).parse().unwrap());

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
