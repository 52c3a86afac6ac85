//! # Models
//!
//! Data models describing the GitHub App itself.
//!
//! Installation, repository, user and contents types live in their own
//! modules and are re-exported from the crate root.

use serde::{Deserialize, Serialize};

use crate::User;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Details of the authenticated GitHub App as returned by `GET /app`.
///
/// # Examples
///
/// ```
/// use github_client::models::AppDetails;
///
/// let app: AppDetails = serde_json::from_str(
///     r#"{"id": 1, "slug": "webflow-demo", "name": "Webflow Demo"}"#,
/// ).unwrap();
/// assert_eq!(app.slug.as_deref(), Some("webflow-demo"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDetails {
    /// The numeric app id
    pub id: u64,
    /// URL-friendly name of the app
    #[serde(default)]
    pub slug: Option<String>,
    /// Display name of the app
    pub name: String,
    /// Account that owns the app
    #[serde(default)]
    pub owner: Option<User>,
    /// Number of installations, when GitHub reports it
    #[serde(default)]
    pub installations_count: Option<u64>,
}
