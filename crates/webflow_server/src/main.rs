//! GitHub App web flow server
//!
//! Main binary for running the web server.
//!
//! # Environment Variables
//!
//! - `GH_APP_CLIENT_ID`, `GH_APP_CLIENT_SECRET`: OAuth credentials of the app
//! - `GH_APP_NAME`: app slug, used for the install link
//! - `GH_APP_ID`, `GH_APP_KEY_PATH`: app id and PEM private key path
//! - `GH_APP_REDIRECT_URI`: OAuth redirect (default: http://localhost:3000/callback)
//! - `GITHUB_API_URL`, `GITHUB_OAUTH_URL`: GitHub base URLs
//! - `API_PORT`: Port to listen on (default: 3000)
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `OUTBOUND_TIMEOUT_SECS`: per-call timeout towards GitHub (default: 10)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use github_client::GitHubClient;
use webflow_server::{ApiConfig, ApiServer, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let github = GitHubClient::new(
        Arc::new(config.identity.clone()),
        config.endpoints.api_base_url.clone(),
    )
    .with_timeout(config.outbound_timeout);

    // Prove the app credentials before accepting any request
    let app = github
        .get_app()
        .await
        .context("GitHub rejected the app credentials")?;

    tracing::info!(
        app_id = app.id,
        app_slug = ?app.slug,
        installations = ?app.installations_count,
        "GitHub App verified"
    );

    let state = AppState::from_config(&config, github)?;
    let server = ApiServer::new(ApiConfig::from(&config), state);

    tracing::info!(app_name = %config.app_name, "Starting GitHub App web flow server");

    // Start server with graceful shutdown
    server.serve().await
}
