//! GitHub App web flow server
//!
//! This crate serves the browser side of a GitHub App:
//! - a landing page with the install and sign-in links,
//! - the OAuth callback, which lands the user on a repository they granted,
//! - pages showing Git data read as the app installation.
//!
//! # Architecture
//!
//! This crate exists in the HTTP layer and handles:
//! - HTTP request/response translation
//! - Error mapping from GitHub failures to error pages
//! - Routing and server configuration
//!
//! GitHub access lives in `github_client`, the OAuth callback logic in
//! `auth_handler` and the HTML views in `template_engine`.

use std::sync::Arc;

use auth_handler::{GitHubWebFlowProvider, WebFlowHandler};
use github_client::{GitDataOperations, GitHubClient, OAuthAppCredentials, OAuthClient};
use template_engine::{IndexView, ViewRenderer};

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use config::{AppConfig, ConfigError};
pub use errors::{ApiError, StartupError};
pub use server::{ApiConfig, ApiServer};

/// Default API port
pub const DEFAULT_PORT: u16 = 3000;

/// Application state shared across handlers
///
/// Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Git data operations performed as the app installation
    pub git_data: Arc<dyn GitDataOperations>,
    /// OAuth callback handling
    pub web_flow: WebFlowHandler,
    /// Compiled HTML views
    pub views: Arc<ViewRenderer>,
    /// Landing page data
    pub index: Arc<IndexView>,
}

impl AppState {
    /// Create new application state from its parts
    pub fn new(
        git_data: Arc<dyn GitDataOperations>,
        web_flow: WebFlowHandler,
        views: ViewRenderer,
        index: IndexView,
    ) -> Self {
        Self {
            git_data,
            web_flow,
            views: Arc::new(views),
            index: Arc::new(index),
        }
    }

    /// Wire the GitHub backed services from the configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The loaded configuration
    /// * `github` - The client authenticated as the app
    ///
    /// # Errors
    ///
    /// Returns `StartupError` if the OAuth client or the views cannot be built.
    pub fn from_config(config: &AppConfig, github: GitHubClient) -> Result<Self, StartupError> {
        let credentials = OAuthAppCredentials {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        };
        let oauth = OAuthClient::new(credentials, &config.endpoints, config.outbound_timeout)?;

        let index = IndexView::new(
            config.app_name.clone(),
            config.client_id.clone(),
            &config.endpoints.oauth_base_url,
            oauth.authorize_url(),
        );
        let web_flow = WebFlowHandler::new(Arc::new(GitHubWebFlowProvider::new(oauth)));

        Ok(Self::new(
            Arc::new(github),
            web_flow,
            ViewRenderer::new()?,
            index,
        ))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
