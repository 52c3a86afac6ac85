//! # Handlebars View Renderer
//!
//! Renders the HTML pages of the web server from templates embedded at build
//! time. Every page is rendered from a serializable view model.
//!
//! ## Views
//!
//! - **index**: landing page with the install and sign-in links
//! - **context**: a GitHub API response, pretty printed, with an optional
//!   decoded file body
//! - **error**: a generic error page carrying only a status and a fixed
//!   message
//!
//! ## Examples
//!
//! ```rust
//! # use template_engine::{ContextView, ViewRenderer};
//! # use serde_json::json;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let renderer = ViewRenderer::new()?;
//!
//! let view = ContextView::new("Branches of acme/widgets", json!([{"name": "master"}]));
//! let html = renderer.render_context(&view)?;
//! assert!(html.contains("&quot;master&quot;"));
//! # Ok(())
//! # }
//! ```

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderErrorReason,
};
use serde::Serialize;
use serde_json::Value;

use crate::Error;

#[cfg(test)]
#[path = "handlebars_tests.rs"]
mod tests;

const INDEX_VIEW: &str = "index";
const CONTEXT_VIEW: &str = "context";
const ERROR_VIEW: &str = "error";

const VIEWS: [(&str, &str); 3] = [
    (INDEX_VIEW, include_str!("../templates/index.hbs")),
    (CONTEXT_VIEW, include_str!("../templates/context.hbs")),
    (ERROR_VIEW, include_str!("../templates/error.hbs")),
];

// ================================
// Custom Handlebars Helpers
// ================================

/// Helper to pretty print a value as JSON.
///
/// The output is HTML escaped with the registry's escape function, since
/// helper output bypasses the escaping applied to plain expressions.
struct JsonHelper;

impl HelperDef for JsonHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let param = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("json", 0))?;

        let pretty = serde_json::to_string_pretty(param.value())
            .map_err(|e| RenderErrorReason::Other(e.to_string()))?;

        out.write(&r.get_escape_fn()(&pretty))?;
        Ok(())
    }
}

// ================================
// View models
// ================================

/// Data shown on the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexView {
    pub app_name: String,
    pub client_id: String,
    pub install_url: String,
    pub authorize_url: String,
}

impl IndexView {
    /// Builds the landing page model.
    ///
    /// The install link points at `{github_base_url}/apps/{app_name}/installations/new`.
    pub fn new(
        app_name: impl Into<String>,
        client_id: impl Into<String>,
        github_base_url: &str,
        authorize_url: impl Into<String>,
    ) -> Self {
        let app_name = app_name.into();
        let install_url = format!(
            "{}/apps/{}/installations/new",
            github_base_url.trim_end_matches('/'),
            app_name
        );
        Self {
            app_name,
            client_id: client_id.into(),
            install_url,
            authorize_url: authorize_url.into(),
        }
    }
}

/// A GitHub API response shown as pretty printed JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ContextView {
    pub title: String,
    /// Decoded file body, rendered above the raw response when present
    pub text: Option<String>,
    pub context: Value,
}

impl ContextView {
    pub fn new(title: impl Into<String>, context: Value) -> Self {
        Self {
            title: title.into(),
            text: None,
            context,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A generic error page.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub status: u16,
    pub message: String,
}

impl ErrorView {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

// ================================
// Renderer
// ================================

/// Handlebars registry holding the compiled views.
///
/// The registry runs in strict mode so a view model missing a field fails
/// loudly instead of rendering an empty string. It is immutable once built
/// and can be shared between request handlers.
#[derive(Debug, Clone)]
pub struct ViewRenderer {
    handlebars: Handlebars<'static>,
}

impl ViewRenderer {
    /// Compiles the built-in views and registers the custom helpers.
    ///
    /// # Errors
    ///
    /// Returns `Error::Compilation` if a view template is invalid.
    pub fn new() -> Result<Self, Error> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_helper("json", Box::new(JsonHelper));

        for (name, template) in VIEWS {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| Error::Compilation {
                    view: name.to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Renders a registered view with the given data.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownView` if no view is registered under `view`
    /// - `Error::Render` if rendering fails
    pub fn render<T: Serialize>(&self, view: &str, data: &T) -> Result<String, Error> {
        if !self.handlebars.has_template(view) {
            return Err(Error::UnknownView(view.to_string()));
        }

        self.handlebars
            .render(view, data)
            .map_err(|e| Error::Render {
                view: view.to_string(),
                message: e.to_string(),
            })
    }

    pub fn render_index(&self, view: &IndexView) -> Result<String, Error> {
        self.render(INDEX_VIEW, view)
    }

    pub fn render_context(&self, view: &ContextView) -> Result<String, Error> {
        self.render(CONTEXT_VIEW, view)
    }

    pub fn render_error(&self, view: &ErrorView) -> Result<String, Error> {
        self.render(ERROR_VIEW, view)
    }
}
