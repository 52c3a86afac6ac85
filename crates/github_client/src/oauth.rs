//! OAuth web flow for a GitHub App.
//!
//! A user authorizes the app on GitHub, which redirects back with a
//! short-lived `code`. [`OAuthClient::exchange_code`] trades that code for a
//! user access token, and the discovery calls use the token to find the
//! installations and repositories the user can reach through the app.

use std::fmt;
use std::time::Duration;

use octocrab::Result as OctocrabResult;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::installation::InstallationList;
use crate::repository::RepositoryList;
use crate::{
    create_token_client, map_octocrab_error, with_timeout, Error, GitHubEndpoints, Installation,
    InstallationId, Repository,
};

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The OAuth client credentials of a GitHub App.
#[derive(Clone)]
pub struct OAuthAppCredentials {
    /// The app's OAuth client id
    pub client_id: String,
    /// The app's OAuth client secret
    pub client_secret: SecretString,
    /// Where GitHub sends the user after authorization
    pub redirect_uri: String,
}

impl fmt::Debug for OAuthAppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthAppCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// A user-to-server access token obtained from the OAuth code exchange.
///
/// Only lives for the duration of one callback request.
#[derive(Clone)]
pub struct UserAccessToken(SecretString);

impl UserAccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for UserAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserAccessToken(<REDACTED>)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Client for the OAuth endpoints of GitHub and the user-token discovery calls.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    credentials: OAuthAppCredentials,
    oauth_base_url: String,
    api_base_url: String,
    timeout: Duration,
}

impl OAuthClient {
    /// Creates a new `OAuthClient`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidResponse` if the HTTP client cannot be built.
    pub fn new(
        credentials: OAuthAppCredentials,
        endpoints: &GitHubEndpoints,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build OAuth HTTP client");
                Error::InvalidResponse
            })?;

        Ok(Self {
            http,
            credentials,
            oauth_base_url: endpoints.oauth_base_url.trim_end_matches('/').to_string(),
            api_base_url: endpoints.api_base_url.clone(),
            timeout,
        })
    }

    /// The OAuth client id of the app.
    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// The URL that starts the OAuth web flow for a user.
    pub fn authorize_url(&self) -> String {
        let base = format!("{}/login/oauth/authorize", self.oauth_base_url);
        match Url::parse_with_params(
            &base,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ],
        ) {
            Ok(url) => url.to_string(),
            Err(e) => {
                error!(error = %e, "Invalid OAuth base URL");
                base
            }
        }
    }

    /// Exchanges an authorization code for a user access token.
    ///
    /// # Errors
    ///
    /// Returns `Error::TokenExchange` if the request fails, GitHub answers
    /// non-2xx, or the response carries no `access_token`.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<UserAccessToken, Error> {
        debug!("Exchanging authorization code for a user access token");

        let url = format!("{}/login/oauth/access_token", self.oauth_base_url);
        let request = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                (
                    "client_secret",
                    self.credentials.client_secret.expose_secret(),
                ),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .send();

        let response = with_timeout(self.timeout, request).await?.map_err(|e| {
            error!(error = %e, "OAuth code exchange request failed");
            Error::TokenExchange("request failed".to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                status = status.as_u16(),
                "GitHub rejected the OAuth code exchange"
            );
            return Err(Error::TokenExchange(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }

        let body = with_timeout(self.timeout, response.text())
            .await?
            .map_err(|e| {
                error!(error = %e, "Failed to read the OAuth code exchange response");
                Error::TokenExchange("unreadable response".to_string())
            })?;

        let token = parse_token_response(&body)?;
        info!("Exchanged authorization code for a user access token");
        Ok(token)
    }

    /// Lists the installations of this app the user can access.
    #[instrument(skip(self, token))]
    pub async fn list_user_installations(
        &self,
        token: &UserAccessToken,
    ) -> Result<Vec<Installation>, Error> {
        let client = create_token_client(&self.api_base_url, token.expose())?;

        let result: OctocrabResult<InstallationList> =
            with_timeout(self.timeout, client.get("/user/installations", None::<&()>)).await?;

        match result {
            Ok(list) => {
                info!(
                    count = list.installations.len(),
                    total_count = list.total_count,
                    installation_ids = ?list.installations.iter().map(|i| i.id).collect::<Vec<_>>(),
                    "Retrieved user installations"
                );
                Ok(list.installations)
            }
            Err(e) => Err(map_octocrab_error("Failed to list user installations", e)),
        }
    }

    /// Lists the repositories the user can access through one installation.
    #[instrument(skip(self, token))]
    pub async fn list_installation_repositories(
        &self,
        token: &UserAccessToken,
        installation_id: InstallationId,
    ) -> Result<Vec<Repository>, Error> {
        let client = create_token_client(&self.api_base_url, token.expose())?;
        let path = format!("/user/installations/{}/repositories", installation_id);

        let result: OctocrabResult<RepositoryList> =
            with_timeout(self.timeout, client.get(path, None::<&()>)).await?;

        match result {
            Ok(list) => {
                info!(
                    installation_id,
                    count = list.repositories.len(),
                    repositories = ?list.repositories.iter().map(|r| r.to_ref().full_name()).collect::<Vec<_>>(),
                    "Retrieved installation repositories"
                );
                Ok(list.repositories)
            }
            Err(e) => Err(map_octocrab_error(
                "Failed to list installation repositories",
                e,
            )),
        }
    }
}

/// Reads the access token out of a code exchange response body.
///
/// GitHub answers JSON when asked to, and `application/x-www-form-urlencoded`
/// otherwise. Both are accepted.
pub(crate) fn parse_token_response(body: &str) -> Result<UserAccessToken, Error> {
    let parsed = match serde_json::from_str::<TokenResponse>(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            let mut parsed = TokenResponse {
                access_token: None,
                error: None,
                error_description: None,
            };
            for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
                match key.as_ref() {
                    "access_token" => parsed.access_token = Some(value.into_owned()),
                    "error" => parsed.error = Some(value.into_owned()),
                    "error_description" => parsed.error_description = Some(value.into_owned()),
                    _ => {}
                }
            }
            parsed
        }
    };

    if let Some(err) = parsed.error {
        let description = parsed.error_description.unwrap_or_else(|| err.clone());
        error!(
            error = %err,
            description = %description,
            "GitHub reported an OAuth error"
        );
        return Err(Error::TokenExchange(description));
    }

    match parsed.access_token {
        Some(token) if !token.is_empty() => Ok(UserAccessToken::new(token)),
        _ => {
            error!("OAuth code exchange response carried no access token");
            Err(Error::TokenExchange("no access token in response".to_string()))
        }
    }
}
