//! GitHub App identity and JWT signing.
//!
//! A GitHub App authenticates as itself with a short-lived RS256 JWT whose
//! issuer is the numeric app id. The token is regenerated for every request
//! that needs it and is never stored.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::Error;

#[cfg(test)]
#[path = "app_identity_tests.rs"]
mod tests;

/// Seconds subtracted from `iat` to tolerate clock drift between us and GitHub.
const CLOCK_SKEW_SECS: u64 = 60;

/// Lifetime of a signed app token. GitHub rejects anything above 10 minutes.
const APP_TOKEN_LIFETIME_SECS: u64 = 9 * 60;

/// JWT claims for GitHub App authentication.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JWTClaims {
    /// Issued at timestamp (seconds since epoch).
    pub(crate) iat: u64,
    /// Expiration timestamp (seconds since epoch).
    pub(crate) exp: u64,
    /// Issuer (GitHub App ID).
    pub(crate) iss: String,
}

/// The identity of a GitHub App: its id and the parsed RSA signing key.
///
/// Built once at startup and shared read-only for the lifetime of the
/// process.
///
/// # Examples
///
/// ```rust,no_run
/// use github_client::AppIdentity;
///
/// # fn example() -> Result<(), github_client::Error> {
/// let identity = AppIdentity::load(123456, "app-key.pem")?;
/// let jwt = identity.sign_app_token()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AppIdentity {
    app_id: u64,
    key: EncodingKey,
}

impl AppIdentity {
    /// Creates an identity from a PEM encoded RSA private key.
    ///
    /// # Errors
    ///
    /// Returns `Error::Credential` if the key cannot be parsed.
    #[instrument(skip(private_key_pem))]
    pub fn new(app_id: u64, private_key_pem: &str) -> Result<Self, Error> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
            error!(
                app_id = app_id,
                error = %e,
                "Failed to parse RSA private key - key format is invalid"
            );
            Error::Credential(format!("Failed to translate the private key. Error was: {e}"))
        })?;

        debug!(app_id = app_id, "Parsed GitHub App private key");

        Ok(Self { app_id, key })
    }

    /// Reads the PEM private key at `key_path` and creates an identity from it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Credential` if the file cannot be read or does not
    /// contain a valid RSA key.
    pub fn load(app_id: u64, key_path: impl AsRef<Path>) -> Result<Self, Error> {
        let key_path = key_path.as_ref();
        let pem = std::fs::read_to_string(key_path).map_err(|e| {
            error!(
                app_id = app_id,
                key_path = %key_path.display(),
                error = %e,
                "Failed to read GitHub App private key"
            );
            Error::Credential(format!(
                "Failed to read private key from {}: {e}",
                key_path.display()
            ))
        })?;

        Self::new(app_id, &pem)
    }

    /// The numeric GitHub App id.
    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    /// Signs a JWT asserting this app's identity.
    ///
    /// The token is issued one minute in the past and expires nine minutes
    /// from now.
    ///
    /// # Errors
    ///
    /// Returns `Error::Credential` if the system clock is before the epoch or
    /// the token cannot be signed.
    pub fn sign_app_token(&self) -> Result<SecretString, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Credential(format!("System time error: {e}")))?
            .as_secs();

        let claims = JWTClaims {
            iat: now.saturating_sub(CLOCK_SKEW_SECS),
            exp: now + APP_TOKEN_LIFETIME_SECS,
            iss: self.app_id.to_string(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| Error::Credential(format!("Failed to encode JWT: {e}")))?;

        debug!(app_id = self.app_id, exp = claims.exp, "Signed GitHub App JWT");

        Ok(SecretString::from(token))
    }
}

impl std::fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppIdentity")
            .field("app_id", &self.app_id)
            .field("key", &"<REDACTED>")
            .finish()
    }
}
