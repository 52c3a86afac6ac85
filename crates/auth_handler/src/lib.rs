//! OAuth web flow handling for the GitHub App web server
//!
//! This crate drives a single OAuth callback from the authorization `code`
//! to the repository page the user should land on:
//!
//! 1. exchange the code for a user access token,
//! 2. list the app installations the user can reach,
//! 3. list the repositories of the chosen installation,
//! 4. redirect to the branches page of the first repository.
//!
//! ## Architecture
//!
//! [`WebFlowHandler`] depends on the [`WebFlowProvider`] trait only.
//! [`GitHubWebFlowProvider`] implements it over `github_client`, and tests
//! drive the handler with an in-memory provider.

use std::sync::Arc;

use async_trait::async_trait;
use github_client::{Installation, InstallationId, Repository, UserAccessToken};
use serde::Deserialize;
use tracing::{info, instrument, warn};

mod github_web_flow_provider;

pub use github_web_flow_provider::GitHubWebFlowProvider;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Result type for web flow operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while handling an OAuth callback
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("OAuth callback did not carry an authorization code")]
    MissingCode,

    #[error("Invalid installation id on callback: {0}")]
    InvalidInstallationId(String),

    #[error("Failed to exchange the authorization code: {0}")]
    TokenExchange(String),

    #[error("The user has no installations of this app")]
    NoInstallations,

    #[error("Installation {installation_id} exposes no repositories")]
    NoRepositories { installation_id: InstallationId },

    #[error("GitHub API error: {0}")]
    GitHubError(String),
}

impl From<github_client::Error> for AuthError {
    fn from(e: github_client::Error) -> Self {
        match e {
            github_client::Error::TokenExchange(message) => AuthError::TokenExchange(message),
            other => AuthError::GitHubError(other.to_string()),
        }
    }
}

/// Query parameters GitHub appends when redirecting back to the app.
///
/// All fields are optional on the wire. `setup_action` is present when the
/// redirect follows an install or update of the app.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub installation_id: Option<String>,
    pub setup_action: Option<String>,
}

/// The GitHub calls the web flow is made of.
#[async_trait]
pub trait WebFlowProvider: Send + Sync {
    /// Exchange an authorization code for a user access token
    ///
    /// # Errors
    /// Returns `AuthError::TokenExchange` if GitHub does not issue a token
    async fn exchange_code(&self, code: &str) -> AuthResult<UserAccessToken>;

    /// List the installations of the app the user can access
    async fn list_installations(&self, token: &UserAccessToken) -> AuthResult<Vec<Installation>>;

    /// List the repositories the user can access through an installation
    async fn list_repositories(
        &self,
        token: &UserAccessToken,
        installation_id: InstallationId,
    ) -> AuthResult<Vec<Repository>>;
}

/// Drives one OAuth callback to its redirect target.
#[derive(Clone)]
pub struct WebFlowHandler {
    provider: Arc<dyn WebFlowProvider>,
}

impl WebFlowHandler {
    pub fn new(provider: Arc<dyn WebFlowProvider>) -> Self {
        Self { provider }
    }

    /// Handle an OAuth callback.
    ///
    /// # Returns
    /// The path of the branches page of the first repository the user can
    /// access, e.g. `/repo/acme/widgets/branches`.
    ///
    /// # Errors
    /// - `AuthError::MissingCode` if `code` is absent or empty
    /// - `AuthError::TokenExchange` if the code cannot be exchanged
    /// - `AuthError::NoInstallations` if the user has no installation
    /// - `AuthError::NoRepositories` if the installation has no repository
    #[instrument(skip(self, params), fields(installation_id = ?params.installation_id, setup_action = ?params.setup_action))]
    pub async fn handle_callback(&self, params: &CallbackParams) -> AuthResult<String> {
        let code = match params.code.as_deref() {
            Some(code) if !code.is_empty() => code,
            _ => {
                warn!("OAuth callback received without a code");
                return Err(AuthError::MissingCode);
            }
        };

        let requested_installation = params
            .installation_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| {
                id.parse::<InstallationId>()
                    .map_err(|_| AuthError::InvalidInstallationId(id.to_string()))
            })
            .transpose()?;

        let token = self.provider.exchange_code(code).await?;

        let installations = self.provider.list_installations(&token).await?;
        info!(
            count = installations.len(),
            "User installations retrieved for callback"
        );

        let first_installation = installations
            .first()
            .map(|installation| installation.id)
            .ok_or(AuthError::NoInstallations)?;
        let installation_id = requested_installation.unwrap_or(first_installation);

        let repositories = self
            .provider
            .list_repositories(&token, installation_id)
            .await?;

        let repository = repositories
            .first()
            .ok_or(AuthError::NoRepositories { installation_id })?;

        let target = format!(
            "/repo/{}/{}/branches",
            repository.owner.login, repository.name
        );
        info!(
            installation_id,
            repository = %repository.to_ref(),
            "OAuth callback completed"
        );
        Ok(target)
    }
}

impl std::fmt::Debug for WebFlowHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebFlowHandler").finish_non_exhaustive()
    }
}
