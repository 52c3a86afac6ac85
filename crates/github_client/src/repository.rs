//! Repository domain types.
//!
//! This module contains types representing GitHub repositories, both as
//! returned by the discovery endpoints and as the `{owner, name}` pair that
//! every Git data operation targets.

use serde::{Deserialize, Serialize};

use crate::User;

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;

/// Identifies a repository by owner login and repository name.
///
/// # Examples
///
/// ```rust
/// use github_client::RepositoryRef;
///
/// let repo = RepositoryRef::new("acme", "widgets");
/// assert_eq!(repo.full_name(), "acme/widgets");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// The owner of the repository (user or organization login)
    pub owner: String,
    /// The name of the repository
    pub name: String,
}

impl RepositoryRef {
    /// Creates a new repository reference.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Returns `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Represents a GitHub repository as listed under an installation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    /// The unique ID of the repository
    #[serde(default)]
    pub id: u64,
    /// The name of the repository
    pub name: String,
    /// The full name of the repository (owner/name)
    #[serde(default)]
    pub full_name: Option<String>,
    /// The account that owns the repository
    pub owner: User,
    /// Whether the repository is private
    #[serde(default)]
    pub private: bool,
}

impl Repository {
    /// Returns the `{owner, name}` pair identifying this repository.
    pub fn to_ref(&self) -> RepositoryRef {
        RepositoryRef::new(self.owner.login.clone(), self.name.clone())
    }
}

/// Page of repositories returned by `GET /user/installations/{id}/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryList {
    /// Total number of repositories visible under the installation
    #[serde(default)]
    pub total_count: u64,
    /// The repositories on this page
    pub repositories: Vec<Repository>,
}
