//! GitHub App installation domain types.
//!
//! This module contains types related to GitHub App installations: the
//! installation itself, the account it is bound to, and the short-lived
//! access token GitHub issues for it.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(test)]
#[path = "installation_tests.rs"]
mod tests;

/// Identifier of a GitHub App installation on one account.
pub type InstallationId = u64;

/// Represents a GitHub account (user or organization).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Account {
    /// The unique ID of the account
    pub id: u64,
    /// The login name of the account
    pub login: String,
    /// The type of account (User or Organization)
    #[serde(rename = "type", default)]
    pub account_type: String,
}

/// Represents a GitHub App installation.
///
/// This struct contains information about where a GitHub App is installed,
/// such as an organization or user account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Installation {
    /// The unique ID of the installation
    pub id: InstallationId,
    /// The account (user or organization) where the app is installed
    pub account: Option<Account>,
    /// Optional repository selection details ("all" or "selected")
    #[serde(default)]
    pub repository_selection: Option<String>,
}

/// Page of installations returned by `GET /user/installations`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationList {
    /// Total number of installations visible to the user
    #[serde(default)]
    pub total_count: u64,
    /// The installations on this page
    pub installations: Vec<Installation>,
}

/// A short-lived access token scoped to one installation.
///
/// The token is deliberately not cached anywhere: every operation that needs
/// one asks GitHub for a fresh token and drops it once the call completes.
#[derive(Clone, Deserialize)]
pub struct InstallationToken {
    #[serde(deserialize_with = "deserialize_secret_string")]
    token: SecretString,
    /// RFC 3339 timestamp at which GitHub will stop accepting the token
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl InstallationToken {
    /// Creates a token from its raw parts.
    pub fn new(token: impl Into<String>, expires_at: Option<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_at,
        }
    }

    /// Returns the bearer token. Callers must not log the returned value.
    pub fn expose(&self) -> &str {
        self.token.expose_secret()
    }

    /// Whether GitHub handed back an empty token.
    pub fn is_empty(&self) -> bool {
        self.token.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"<REDACTED>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub(crate) fn deserialize_secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::from(s))
}
