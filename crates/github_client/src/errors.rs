//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when talking to GitHub
//! as an App, as an installation, or on behalf of a user who went through the
//! OAuth web flow.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// Each variant maps to one failure class of the web flow: bad app
/// credentials, an app that is not installed on the target repository, a
/// failed token exchange, or a plain non-2xx answer from the REST API.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.list_branches("acme", "widgets").await {
///     Ok(branches) => println!("{branches}"),
///     Err(Error::NotInstalled { owner, repo }) => eprintln!("install the app on {owner}/{repo}"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The GitHub App credentials could not be loaded or used.
    ///
    /// This error occurs when:
    /// - The private key file cannot be read
    /// - The private key is not a valid RSA PEM
    /// - The JWT cannot be signed
    #[error("Invalid GitHub App credentials: {0}")]
    Credential(String),

    /// The GitHub App is not installed on the requested repository.
    ///
    /// Raised when `GET /repos/{owner}/{repo}/installation` answers 404.
    #[error("GitHub App is not installed on repository: {owner}/{repo}")]
    NotInstalled {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
    },

    /// Exchanging an installation id for an installation access token failed.
    #[error("Failed to create an access token for installation: {installation_id}")]
    AuthExchange {
        /// The installation the token was requested for
        installation_id: u64,
    },

    /// Exchanging an OAuth authorization code for a user token failed.
    ///
    /// The contained string describes what GitHub answered, without any
    /// credential material.
    #[error("Failed to exchange the OAuth code for a user access token: {0}")]
    TokenExchange(String),

    /// The GitHub API answered with a non-2xx status.
    #[error("GitHub API request failed with status {status}: {message}")]
    UpstreamHttp {
        /// HTTP status code returned by GitHub
        status: u16,
        /// Error message returned by GitHub
        message: String,
    },

    /// An outbound call did not complete within the configured timeout.
    #[error("GitHub API request timed out after {0} seconds")]
    Timeout(u64),

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The GitHub API returned a response in an unexpected format.
    ///
    /// This covers transport failures and octocrab errors that carry no
    /// HTTP status.
    #[error("Invalid response format")]
    InvalidResponse,
}

impl Error {
    /// Returns the upstream HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::NotInstalled { .. } => Some(404),
            Error::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }
}
