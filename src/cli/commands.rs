//! CLI command handlers
//!
//! Each subcommand gets a handler that builds the HTTP client, resolves
//! whatever authentication it needs, runs the request, and prints the
//! typed response as pretty JSON. The order-download handler drives the
//! full token-resolution / interactive-configuration / download workflow.

use serde::Serialize;
use tracing::info;

use crate::app::client::GeonorgeClient;
use crate::app::models::CanDownloadRequest;
use crate::app::order::{execute_order, resolve_order_token};
use crate::auth::{ensure_credentials, optional_credentials, CredentialStore, TokenStore};
use crate::cli::args::{
    AuthTestArgs, CanDownloadArgs, Cli, Commands, DatasetArgs, DownloadFileArgs, OrderCreateArgs,
    OrderDownloadArgs, OrderGetArgs,
};
use crate::cli::interactive::configure_interactively;
use crate::cli::prompt::ConsoleReader;
use crate::constants::{env as env_constants, http, services};
use crate::errors::{ApiError, Result};

/// Whether a 401 from this command should clear the saved credentials
/// and token
pub fn is_auth_relevant(command: &Commands) -> bool {
    matches!(
        command,
        Commands::OrderDownload(_)
            | Commands::OrderGet(_)
            | Commands::OrderCreate(_)
            | Commands::DownloadFile(_)
            | Commands::AuthTest(_)
    )
}

/// Dispatch the parsed CLI to its handler
pub async fn run(cli: Cli, credential_store: &CredentialStore, token_store: &TokenStore) -> Result<()> {
    let base_url = resolve_base_url(cli.global.base_url.clone());
    let username = cli.global.username.clone();
    let password = cli.global.password.clone();

    match cli.command {
        Commands::OrderDownload(args) => {
            handle_order_download(args, &base_url, username, password, credential_store, token_store)
                .await
        }
        Commands::Capabilities(args) => handle_capabilities(args, &base_url, username, password).await,
        Commands::Areas(args) => handle_areas(args, &base_url, username, password).await,
        Commands::Projections(args) => handle_projections(args, &base_url, username, password).await,
        Commands::Formats(args) => handle_formats(args, &base_url, username, password).await,
        Commands::CanDownload(args) => handle_can_download(args, &base_url, username, password).await,
        Commands::OrderCreate(args) => {
            handle_order_create(args, &base_url, username, password, credential_store).await
        }
        Commands::OrderGet(args) => {
            handle_order_get(args, &base_url, username, password, credential_store).await
        }
        Commands::DownloadFile(args) => {
            handle_download_file(args, &base_url, username, password, credential_store).await
        }
        Commands::AuthTest(args) => {
            handle_auth_test(args, username, password, credential_store).await
        }
    }
}

/// Flag wins over environment over the built-in service URL
pub fn resolve_base_url(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var(env_constants::BASE_URL).ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| services::DOWNLOAD_BASE_URL.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).map_err(ApiError::Decode)?);
    Ok(())
}

/// Client for commands that work anonymously but pass basic auth along
/// when flags or environment supply it
fn anonymous_client(
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
) -> Result<GeonorgeClient> {
    let credentials = optional_credentials(username, password)?;
    GeonorgeClient::new(base_url, credentials)
}

/// Client for commands that require basic auth, resolving credentials
/// through flags, environment, the store, and finally a prompt
fn authenticated_client(
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
    store: &CredentialStore,
) -> Result<GeonorgeClient> {
    let credentials = ensure_credentials(username, password, store)?;
    GeonorgeClient::new(base_url, Some(credentials))
}

async fn handle_capabilities(
    args: DatasetArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let client = anonymous_client(base_url, username, password)?;
    let capabilities = client.get_capabilities(&args.uuid).await?;
    print_json(&capabilities)
}

async fn handle_areas(
    args: DatasetArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let client = anonymous_client(base_url, username, password)?;
    let areas = client.get_areas(&args.uuid).await?;
    print_json(&areas)
}

async fn handle_projections(
    args: DatasetArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let client = anonymous_client(base_url, username, password)?;
    let projections = client.get_projections(&args.uuid).await?;
    print_json(&projections)
}

async fn handle_formats(
    args: DatasetArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let client = anonymous_client(base_url, username, password)?;
    let formats = client.get_formats(&args.uuid).await?;
    print_json(&formats)
}

async fn handle_can_download(
    args: CanDownloadArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let client = anonymous_client(base_url, username, password)?;
    let request = CanDownloadRequest {
        metadata_uuid: args.uuid,
        coordinates: args.coordinates,
        coordinate_system: args.coordinate_system,
    };
    let response = client.can_download(&request).await?;
    print_json(&response)
}

async fn handle_order_create(
    args: OrderCreateArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
    store: &CredentialStore,
) -> Result<()> {
    let client = authenticated_client(base_url, username, password, store)?;
    let raw = tokio::fs::read_to_string(&args.file).await?;
    let request = serde_json::from_str(&raw).map_err(ApiError::Decode)?;
    let order = client.create_order(&request).await?;
    print_json(&order)
}

async fn handle_order_get(
    args: OrderGetArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
    store: &CredentialStore,
) -> Result<()> {
    let client = authenticated_client(base_url, username, password, store)?;
    let order = client.get_order(&args.reference).await?;
    print_json(&order)
}

async fn handle_download_file(
    args: DownloadFileArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
    store: &CredentialStore,
) -> Result<()> {
    let client = authenticated_client(base_url, username, password, store)?;
    let destination = args
        .destination
        .unwrap_or_else(|| std::path::PathBuf::from(format!("{}.zip", args.file_id)));
    client
        .download_order_file(&args.reference, &args.file_id, &destination)
        .await?;
    println!("Downloaded: {}", destination.display());
    Ok(())
}

/// Exercise an authenticated endpoint with basic auth.
///
/// The default target is httpbin's basic-auth echo built from the
/// resolved credentials; any non-2xx is an [`ApiError::Status`] so a 401
/// here takes the same cache-clearing path as a real service rejection.
async fn handle_auth_test(
    args: AuthTestArgs,
    username: Option<String>,
    password: Option<String>,
    store: &CredentialStore,
) -> Result<()> {
    let credentials = ensure_credentials(username, password, store)?;
    let url = args.url.unwrap_or_else(|| {
        format!(
            "{}/{}/{}",
            services::AUTH_TEST_BASE_URL,
            credentials.username,
            credentials.password
        )
    });

    let client = reqwest::Client::builder()
        .timeout(http::DEFAULT_TIMEOUT)
        .connect_timeout(http::CONNECT_TIMEOUT)
        .user_agent(http::USER_AGENT)
        .build()
        .map_err(ApiError::Http)?;

    let response = client
        .get(&url)
        .basic_auth(&credentials.username, Some(&credentials.password))
        .send()
        .await
        .map_err(ApiError::Http)?;

    let status = response.status();
    let body = response.text().await.map_err(ApiError::Http)?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        }
        .into());
    }

    println!("Authentication OK ({}).", status.as_u16());
    println!("{}", body);
    Ok(())
}

async fn handle_order_download(
    args: OrderDownloadArgs,
    base_url: &str,
    username: Option<String>,
    password: Option<String>,
    credential_store: &CredentialStore,
    token_store: &TokenStore,
) -> Result<()> {
    let mut options = args.into_options();
    let client = GeonorgeClient::new(base_url, None)?;

    let token = resolve_order_token(
        options.token.clone(),
        &options.metadata_uuid,
        token_store,
        credential_store,
        username,
        password,
    )
    .await?;

    if options.interactive {
        let mut reader = ConsoleReader;
        options = configure_interactively(&mut reader, &client, options, &token).await?;
    }

    let report = execute_order(&client, &options, &token).await?;
    info!(
        "Order {} finished: {} downloaded, {} skipped",
        report.reference_number,
        report.downloaded.len(),
        report.skipped.len()
    );
    if !report.downloaded.is_empty() {
        println!(
            "Done: {} file(s) in {}",
            report.downloaded.len(),
            options.output_dir.display()
        );
    }
    Ok(())
}
