use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types that can occur while rendering a view.
///
/// # Examples
///
/// ```rust
/// use template_engine::Error;
///
/// let error = Error::UnknownView("missing".to_string());
/// assert_eq!(error.to_string(), "Unknown view: missing");
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A built-in view failed to compile.
    ///
    /// The views are embedded at build time, so this only happens when a
    /// template file contains invalid Handlebars syntax.
    #[error("Template compilation failed for view {view}: {message}")]
    Compilation {
        /// The view whose template failed to compile
        view: String,
        /// Detailed error message from the Handlebars parser
        message: String,
    },

    /// Rendering a compiled view failed.
    ///
    /// Typically a view model that lacks a field the template references,
    /// since the registry runs in strict mode.
    #[error("Template rendering failed for view {view}: {message}")]
    Render {
        /// The view that failed to render
        view: String,
        /// Detailed error message from the Handlebars renderer
        message: String,
    },

    /// No view is registered under the requested name.
    #[error("Unknown view: {0}")]
    UnknownView(String),
}
