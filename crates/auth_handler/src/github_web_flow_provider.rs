//! GitHub implementation of the web flow provider
//!
//! Provides the concrete implementation of `WebFlowProvider` backed by the
//! GitHub OAuth and REST endpoints.

use crate::{AuthResult, WebFlowProvider};
use async_trait::async_trait;
use github_client::{Installation, InstallationId, OAuthClient, Repository, UserAccessToken};

/// GitHub web flow provider
///
/// Concrete implementation of `WebFlowProvider` that talks to GitHub through
/// an [`OAuthClient`].
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use auth_handler::{GitHubWebFlowProvider, WebFlowHandler};
/// use github_client::{GitHubEndpoints, OAuthAppCredentials, OAuthClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = OAuthAppCredentials {
///     client_id: "Iv1.8a61f9b3a7aba766".to_string(),
///     client_secret: "secret".to_string().into(),
///     redirect_uri: "http://localhost:3000/callback".to_string(),
/// };
/// let client = OAuthClient::new(credentials, &GitHubEndpoints::default(), Duration::from_secs(10))?;
///
/// let handler = WebFlowHandler::new(Arc::new(GitHubWebFlowProvider::new(client)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitHubWebFlowProvider {
    client: OAuthClient,
}

impl GitHubWebFlowProvider {
    /// Create a new provider over an OAuth client
    pub fn new(client: OAuthClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebFlowProvider for GitHubWebFlowProvider {
    async fn exchange_code(&self, code: &str) -> AuthResult<UserAccessToken> {
        Ok(self.client.exchange_code(code).await?)
    }

    async fn list_installations(&self, token: &UserAccessToken) -> AuthResult<Vec<Installation>> {
        Ok(self.client.list_user_installations(token).await?)
    }

    async fn list_repositories(
        &self,
        token: &UserAccessToken,
        installation_id: InstallationId,
    ) -> AuthResult<Vec<Repository>> {
        Ok(self
            .client
            .list_installation_repositories(token, installation_id)
            .await?)
    }
}
