//! View rendering for the GitHub App web server
//!
//! This crate renders the HTML pages served by the web server from
//! Handlebars templates compiled once at startup.

mod errors;
pub use errors::Error;

mod handlebars_engine;
pub use handlebars_engine::{ContextView, ErrorView, IndexView, ViewRenderer};
