//! HTTP request handlers
//!
//! Each Git data handler:
//! 1. Extracts the repository and arguments from the path and query
//! 2. Calls one Git data operation, which resolves the installation and a
//!    fresh installation token on its own
//! 3. Renders the JSON response into the context page
//! 4. Maps failures to the generic error page

use auth_handler::CallbackParams;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Json,
};
use github_client::decode_file_content;
use serde::{Deserialize, Serialize};
use template_engine::ContextView;

use crate::{errors::ApiError, AppState};

/// Query string of the contents page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentsParams {
    /// Git ref to read from; `master` when absent
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

/// GET /
///
/// Landing page with the install link and the OAuth sign-in link.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    state
        .views
        .render_index(&state.index)
        .map(Html)
        .map_err(|e| ApiError::internal(e, &state.views))
}

/// GET /callback
///
/// Completes the OAuth web flow. Always answers with a redirect: to the
/// branches page of the first granted repository on success, to `/` on any
/// failure. The failure itself is only logged.
pub async fn callback(
    State(state): State<AppState>,
    params: Option<Query<CallbackParams>>,
) -> Redirect {
    let params = match params {
        Some(Query(params)) => params,
        None => {
            tracing::warn!("OAuth callback query string could not be parsed");
            CallbackParams::default()
        }
    };

    match state.web_flow.handle_callback(&params).await {
        Ok(target) => Redirect::to(&target),
        Err(e) => {
            tracing::error!(error = %e, "OAuth callback failed, redirecting to the landing page");
            Redirect::to("/")
        }
    }
}

/// GET /repo/:owner/:repo/branches
pub async fn branches(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let branches = state
        .git_data
        .list_branches(&owner, &repo)
        .await
        .map_err(|e| ApiError::from_github(e, &state.views))?;

    render_context(
        &state,
        ContextView::new(format!("Branches of {owner}/{repo}"), branches),
    )
}

/// GET /repo/:owner/:repo/:sha
pub async fn tree(
    State(state): State<AppState>,
    Path((owner, repo, sha)): Path<(String, String, String)>,
) -> Result<Html<String>, ApiError> {
    let tree = state
        .git_data
        .get_tree(&owner, &repo, &sha)
        .await
        .map_err(|e| ApiError::from_github(e, &state.views))?;

    render_context(
        &state,
        ContextView::new(format!("Tree {sha} of {owner}/{repo}"), tree),
    )
}

/// GET /contents/:owner/:repo/*path?ref=
///
/// Shows a file or directory. Files are decoded for display when they are
/// valid UTF-8.
pub async fn contents(
    State(state): State<AppState>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Query(params): Query<ContentsParams>,
) -> Result<Html<String>, ApiError> {
    let contents = state
        .git_data
        .get_contents(&owner, &repo, &path, params.reference.as_deref())
        .await
        .map_err(|e| ApiError::from_github(e, &state.views))?;

    let text = decode_file_content(&contents);
    let mut view = ContextView::new(format!("{path} in {owner}/{repo}"), contents);
    if let Some(text) = text {
        view = view.with_text(text);
    }

    render_context(&state, view)
}

fn render_context(state: &AppState, view: ContextView) -> Result<Html<String>, ApiError> {
    state
        .views
        .render_context(&view)
        .map(Html)
        .map_err(|e| ApiError::internal(e, &state.views))
}

/// GET /health
///
/// Health check endpoint.
///
/// Returns service health status with version and timestamp.
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Current timestamp (ISO 8601)
    pub timestamp: String,
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
