//! Error handling and HTTP error conversion
//!
//! Failures of the Git data pages are turned into a generic HTML error page.
//! The page carries only the status code and a fixed message. Upstream error
//! text stays in the server log.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use template_engine::{ErrorView, ViewRenderer};

use crate::config::ConfigError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that prevent the server from starting
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("GitHub client setup failed: {0}")]
    GitHub(#[from] github_client::Error),

    #[error("View setup failed: {0}")]
    Views(#[from] template_engine::Error),
}

/// An error page ready to be sent to the browser.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
///     let branches = state
///         .git_data
///         .list_branches("acme", "widgets")
///         .await
///         .map_err(|e| ApiError::from_github(e, &state.views))?;
///     // ...
/// }
/// ```
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: String,
}

impl ApiError {
    /// Build the error page for a failed GitHub call.
    pub fn from_github(error: github_client::Error, views: &ViewRenderer) -> Self {
        let status = status_for(&error);
        log_error(&error, status);
        Self::page(status, views)
    }

    /// Build the error page for an internal failure.
    pub fn internal(error: impl std::fmt::Display, views: &ViewRenderer) -> Self {
        tracing::error!(error = %error, "Internal error while serving request");
        Self::page(StatusCode::INTERNAL_SERVER_ERROR, views)
    }

    /// Render the generic page for `status`.
    pub fn page(status: StatusCode, views: &ViewRenderer) -> Self {
        let message = public_message(status);
        let body = views
            .render_error(&ErrorView::new(status.as_u16(), message))
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to render the error page");
                message.to_string()
            });

        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Html(self.body)).into_response()
    }
}

/// Map a GitHub client error to the status shown to the browser.
pub fn status_for(error: &github_client::Error) -> StatusCode {
    use github_client::Error;

    match error {
        Error::NotInstalled { .. } => StatusCode::NOT_FOUND,
        Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::AuthExchange { .. }
        | Error::TokenExchange(_)
        | Error::UpstreamHttp { .. }
        | Error::Deserialization(_)
        | Error::InvalidResponse => StatusCode::BAD_GATEWAY,
    }
}

fn public_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "The GitHub App is not installed on this repository.",
        StatusCode::BAD_GATEWAY => "The request to GitHub failed.",
        StatusCode::GATEWAY_TIMEOUT => "GitHub did not answer in time.",
        _ => "An internal error occurred.",
    }
}

/// Log error with appropriate level based on HTTP status
fn log_error(error: &github_client::Error, status: StatusCode) {
    match status {
        StatusCode::NOT_FOUND => {
            tracing::warn!(status = status.as_u16(), error = %error, "GitHub request failed");
        }
        _ => {
            tracing::error!(status = status.as_u16(), error = %error, "GitHub request failed");
        }
    }
}
