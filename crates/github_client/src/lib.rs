//! Crate for interacting with the GitHub REST API on behalf of a GitHub App.
//!
//! This crate provides:
//! - [`AppIdentity`]: the app id and private key, able to sign app JWTs
//! - [`GitHubClient`]: calls made as the app, including resolution of the
//!   installation bound to a repository and of its access token
//! - [`OAuthClient`]: the OAuth web flow code exchange and the discovery calls
//!   made with the resulting user token
//! - [`GitDataOperations`]: Git data-plane calls made as an installation
//!
//! Installation access tokens are never cached. Each Git data operation
//! resolves the installation and a fresh token immediately before its own
//! REST call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use octocrab::{Octocrab, Result as OctocrabResult};
use secrecy::ExposeSecret;
use tracing::{debug, error, info, instrument};

pub mod app_identity;
pub use app_identity::AppIdentity;

pub mod contents;
pub use contents::{decode_file_content, PutContentsRequest, DEFAULT_CONTENTS_REF};

pub mod errors;
pub use errors::Error;

pub mod git_data;
pub use git_data::{CommitAuthor, CreateCommitRequest, GitDataOperations};

pub mod installation;
pub use installation::{Account, Installation, InstallationId, InstallationToken};

pub mod models;

pub mod oauth;
pub use oauth::{OAuthAppCredentials, OAuthClient, UserAccessToken};

pub mod repository;
pub use repository::{Repository, RepositoryRef};

pub mod user;
pub use user::User;

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Default base URL of the GitHub REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default base URL of the GitHub OAuth endpoints.
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://github.com";

/// Default upper bound for a single outbound call.
pub const DEFAULT_OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URLs of the two GitHub hosts the web flow talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubEndpoints {
    /// REST API base, e.g. `https://api.github.com`
    pub api_base_url: String,
    /// OAuth base, e.g. `https://github.com`
    pub oauth_base_url: String,
}

impl Default for GitHubEndpoints {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
        }
    }
}

/// A client for interacting with the GitHub API, authenticated as a GitHub App.
///
/// Every request made as the app carries a freshly signed JWT. Requests made
/// as an installation carry a freshly exchanged installation token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    identity: Arc<AppIdentity>,
    api_base_url: String,
    timeout: Duration,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` for the given app identity.
    ///
    /// # Arguments
    ///
    /// * `identity` - The app id and private key.
    /// * `api_base_url` - Base URL of the GitHub REST API.
    pub fn new(identity: Arc<AppIdentity>, api_base_url: impl Into<String>) -> Self {
        Self {
            identity,
            api_base_url: api_base_url.into(),
            timeout: DEFAULT_OUTBOUND_TIMEOUT,
        }
    }

    /// Sets the upper bound applied to each outbound call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The numeric id of the app this client authenticates as.
    pub fn app_id(&self) -> u64 {
        self.identity.app_id()
    }

    /// Builds an octocrab client that authenticates with a newly signed app JWT.
    fn app_client(&self) -> Result<Octocrab, Error> {
        let jwt = self.identity.sign_app_token()?;
        create_token_client(&self.api_base_url, jwt.expose_secret())
    }

    /// Fetches the details of the authenticated app.
    ///
    /// Used once at startup to prove the app id and private key are accepted
    /// by GitHub.
    ///
    /// # Errors
    ///
    /// Returns `Error::Credential` if no JWT can be signed and
    /// `Error::UpstreamHttp` if GitHub rejects it.
    #[instrument(skip(self), fields(app_id = self.app_id()))]
    pub async fn get_app(&self) -> Result<models::AppDetails, Error> {
        let client = self.app_client()?;
        let result: OctocrabResult<models::AppDetails> =
            with_timeout(self.timeout, client.get("/app", None::<&()>)).await?;

        match result {
            Ok(app) => {
                info!(
                    app_id = app.id,
                    app_name = app.name,
                    "Retrieved GitHub App details"
                );
                Ok(app)
            }
            Err(e) => Err(map_octocrab_error("Failed to get GitHub App details", e)),
        }
    }

    /// Finds the installation of this app bound to a repository.
    ///
    /// # Arguments
    ///
    /// * `owner` - The owner of the repository (user or organization name).
    /// * `repo` - The name of the repository.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInstalled` if GitHub answers 404, meaning the app is
    /// not installed on the repository, and `Error::UpstreamHttp` for any
    /// other failure.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn resolve_installation_id(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<InstallationId, Error> {
        let client = self.app_client()?;
        let path = repo_route(owner, repo, "installation");

        let result: OctocrabResult<Installation> =
            with_timeout(self.timeout, client.get(path, None::<&()>)).await?;

        match result {
            Ok(installation) => {
                debug!(
                    owner = owner,
                    repo = repo,
                    installation_id = installation.id,
                    "Found installation for repository"
                );
                Ok(installation.id)
            }
            Err(e) => match map_octocrab_error("Failed to find repository installation", e) {
                Error::UpstreamHttp { status: 404, .. } => {
                    error!(
                        owner = owner,
                        repo = repo,
                        "GitHub App is not installed on this repository"
                    );
                    Err(Error::NotInstalled {
                        owner: owner.to_string(),
                        repo: repo.to_string(),
                    })
                }
                other => Err(other),
            },
        }
    }

    /// Exchanges an installation id for a short-lived installation access token.
    ///
    /// Each call asks GitHub for a new token; nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthExchange` on any non-2xx answer or when GitHub
    /// returns an empty token.
    #[instrument(skip(self))]
    pub async fn resolve_installation_token(
        &self,
        installation_id: InstallationId,
    ) -> Result<InstallationToken, Error> {
        let client = self.app_client()?;
        let path = format!("/app/installations/{}/access_tokens", installation_id);

        let result: OctocrabResult<InstallationToken> =
            with_timeout(self.timeout, client.post(path, None::<&()>)).await?;

        match result {
            Ok(token) if !token.is_empty() => {
                info!(
                    installation_id,
                    expires_at = ?token.expires_at,
                    "Created access token for installation"
                );
                Ok(token)
            }
            Ok(_) => {
                error!(installation_id, "GitHub returned an empty installation token");
                Err(Error::AuthExchange { installation_id })
            }
            Err(e) => {
                error!(
                    installation_id,
                    "Failed to create a token for the installation"
                );
                log_octocrab_error("Failed to get installation token", e);
                Err(Error::AuthExchange { installation_id })
            }
        }
    }

    /// Resolves the installation bound to `owner/repo` and a fresh access
    /// token for it, returning a client authenticated as that installation.
    ///
    /// This is the only way Git data operations obtain credentials, so every
    /// operation performs both resolution steps, in order, right before its
    /// own request.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn installation_session(&self, owner: &str, repo: &str) -> Result<Octocrab, Error> {
        let installation_id = self.resolve_installation_id(owner, repo).await?;
        let token = self.resolve_installation_token(installation_id).await?;
        create_token_client(&self.api_base_url, token.expose())
    }

    /// Removes an installation of this app.
    ///
    /// # Errors
    ///
    /// Returns `Error::UpstreamHttp` if GitHub does not answer 2xx.
    #[instrument(skip(self))]
    pub async fn delete_installation(&self, installation_id: InstallationId) -> Result<(), Error> {
        let client = self.app_client()?;
        let path = format!("/app/installations/{}", installation_id);

        let response = with_timeout(self.timeout, client._delete(path.as_str(), None::<&()>))
            .await?
            .map_err(|e| map_octocrab_error("Failed to delete installation", e))?;

        let status = response.status();
        if !status.is_success() {
            error!(
                installation_id,
                status = status.as_u16(),
                "GitHub refused to delete the installation"
            );
            return Err(Error::UpstreamHttp {
                status: status.as_u16(),
                message: "Failed to delete installation".to_string(),
            });
        }

        info!(installation_id, "Deleted installation");
        Ok(())
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Creates an `Octocrab` client that sends `Authorization: Bearer <token>`.
///
/// Works for app JWTs, installation tokens and OAuth user tokens alike.
///
/// # Errors
///
/// Returns `Error::InvalidResponse` if the base URL is invalid or the client
/// cannot be built.
pub fn create_token_client(base_uri: &str, token: &str) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .base_uri(base_uri)
        .map_err(|e| {
            error!(base_uri = base_uri, error = %e, "Invalid GitHub API base URI");
            Error::InvalidResponse
        })?
        .personal_token(token.to_string())
        .build()
        .map_err(|e| {
            error!(error = ?e, "Failed to build Octocrab client");
            Error::InvalidResponse
        })
}

/// Runs an outbound call, failing with `Error::Timeout` once `timeout` elapses.
pub(crate) async fn with_timeout<F, T>(timeout: Duration, future: F) -> Result<T, Error>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(timeout, future).await.map_err(|_| {
        error!(timeout_secs = timeout.as_secs(), "GitHub API request timed out");
        Error::Timeout(timeout.as_secs())
    })
}

/// Percent-encodes a value used as one REST path segment.
///
/// `/`, `?`, `%` and `#` are encoded, and a bare `.` or `..` keeps its dots
/// encoded, so the value can never leave its segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    match segment {
        "." | ".." => segment.replace('.', "%2E"),
        _ => urlencoding::encode(segment).into_owned(),
    }
}

/// Builds `/repos/{owner}/{repo}/{rest}` with `owner` and `repo` encoded.
///
/// `rest` is taken as is and must already be encoded.
pub(crate) fn repo_route(owner: &str, repo: &str, rest: &str) -> String {
    format!(
        "/repos/{}/{}/{}",
        encode_segment(owner),
        encode_segment(repo),
        rest
    )
}

/// Logs an octocrab error and converts it to this crate's error type.
pub(crate) fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    let mapped = match &e {
        octocrab::Error::GitHub { source, .. } => Error::UpstreamHttp {
            status: source.status_code.as_u16(),
            message: source.message.clone(),
        },
        _ => Error::InvalidResponse,
    };
    log_octocrab_error(message, e);
    mapped
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, .. } => error!(
            status = source.status_code.as_u16(),
            error_message = source.message,
            "{}. Received an error from GitHub",
            message
        ),
        octocrab::Error::UriParse { source, .. } => error!(
            error_message = source.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, .. } => error!(
            error_message = source.to_string(),
            "{}, Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidHeaderValue { source, .. } => error!(
            error_message = source.to_string(),
            "{}. One of the header values was invalid.",
            message
        ),
        octocrab::Error::InvalidUtf8 { source, .. } => error!(
            error_message = source.to_string(),
            "{}. The message wasn't valid UTF-8.",
            message,
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
