//! Startup configuration
//!
//! All settings are read from the environment once, before the server binds.
//! A missing required value or an unusable private key stops the process.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use github_client::{AppIdentity, GitHubEndpoints, DEFAULT_API_BASE_URL, DEFAULT_OAUTH_BASE_URL};
use secrecy::SecretString;

use crate::DEFAULT_PORT;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Environment variable {name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("The GitHub App private key at {path} is not usable: {source}")]
    InvalidKey {
        path: PathBuf,
        #[source]
        source: github_client::Error,
    },
}

/// Configuration of the web server and its GitHub App.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OAuth client id of the app
    pub client_id: String,
    /// OAuth client secret of the app
    pub client_secret: SecretString,
    /// App slug, used for the install link
    pub app_name: String,
    /// App id and private key, read from `GH_APP_KEY_PATH` once
    pub identity: AppIdentity,
    /// Where GitHub sends the user after authorization
    pub redirect_uri: String,
    /// REST and OAuth base URLs
    pub endpoints: GitHubEndpoints,
    /// Address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Upper bound of each outbound call to GitHub
    pub outbound_timeout: Duration,
}

impl AppConfig {
    /// Load the configuration from the process environment.
    ///
    /// Required variables:
    /// - `GH_APP_CLIENT_ID`
    /// - `GH_APP_CLIENT_SECRET`
    /// - `GH_APP_NAME`
    /// - `GH_APP_ID`: numeric
    /// - `GH_APP_KEY_PATH`: path of the PEM encoded private key
    ///
    /// Optional variables: `GH_APP_REDIRECT_URI`, `GITHUB_API_URL`,
    /// `GITHUB_OAUTH_URL`, `API_HOST`, `API_PORT`, `OUTBOUND_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &'static str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let client_id = required("GH_APP_CLIENT_ID")?;
        let client_secret = SecretString::from(required("GH_APP_CLIENT_SECRET")?);
        let app_name = required("GH_APP_NAME")?;

        let app_id = required("GH_APP_ID")?
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid {
                name: "GH_APP_ID",
                reason: e.to_string(),
            })?;

        let key_path = PathBuf::from(required("GH_APP_KEY_PATH")?);
        let identity = AppIdentity::load(app_id, &key_path).map_err(|source| {
            ConfigError::InvalidKey {
                path: key_path.clone(),
                source,
            }
        })?;

        let port = optional("API_PORT", &DEFAULT_PORT.to_string())
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid {
                name: "API_PORT",
                reason: e.to_string(),
            })?;

        let timeout_secs = optional(
            "OUTBOUND_TIMEOUT_SECS",
            &DEFAULT_OUTBOUND_TIMEOUT_SECS.to_string(),
        )
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::Invalid {
            name: "OUTBOUND_TIMEOUT_SECS",
            reason: e.to_string(),
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "OUTBOUND_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            client_id,
            client_secret,
            app_name,
            identity,
            redirect_uri: optional("GH_APP_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            endpoints: GitHubEndpoints {
                api_base_url: optional("GITHUB_API_URL", DEFAULT_API_BASE_URL),
                oauth_base_url: optional("GITHUB_OAUTH_URL", DEFAULT_OAUTH_BASE_URL),
            },
            host: optional("API_HOST", DEFAULT_HOST),
            port,
            outbound_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
