//! HTTP routing configuration
//!
//! This module defines all HTTP routes and their corresponding handlers.
//!
//! # Route Structure
//!
//! - GET /                                  - Landing page
//! - GET /callback                          - OAuth callback
//! - GET /repo/:owner/:repo/branches        - Branches of a repository
//! - GET /repo/:owner/:repo/:sha            - Tree at a commit or tree SHA
//! - GET /contents/:owner/:repo/*path?ref=  - File or directory contents
//! - GET /health                            - Health check

use axum::{extract::Request, middleware, routing::get, Router};
use std::time::Duration;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Span;

use crate::{handlers, middleware as api_middleware, AppState};

/// Upper bound for handling one inbound request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the complete router with all routes configured.
///
/// This function sets up:
/// - All page routes
/// - Request tracing
/// - Timeout handling
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(make_request_span)
        .on_response(DefaultOnResponse::new());

    // Configure request timeout (30 seconds)
    let timeout_layer = TimeoutLayer::new(REQUEST_TIMEOUT);

    Router::new()
        .route("/", get(handlers::index))
        .route("/callback", get(handlers::callback))
        .route("/repo/:owner/:repo/branches", get(handlers::branches))
        .route("/repo/:owner/:repo/:sha", get(handlers::tree))
        .route("/contents/:owner/:repo/*path", get(handlers::contents))
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn(api_middleware::tracing_middleware))
        .layer(timeout_layer)
        .layer(trace_layer)
        .with_state(state)
}

/// Span for one inbound request.
///
/// Only the path is recorded. The query string and headers stay out of the
/// log since the callback carries the OAuth code and cookies may hold
/// session data.
pub fn make_request_span(request: &Request) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    )
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
