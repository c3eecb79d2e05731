//! Authentication configuration
//!
//! Bearer tokens are HS256 JWTs minted by the hosted auth service; we only
//! need the shared secret plus the claims we expect.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

const MIN_SECRET_LEN: usize = 32;

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared JWT signing secret
    pub jwt_secret: SecretString,

    /// Expected `iss` claim, unchecked when absent
    pub issuer: Option<String>,

    /// Expected `aud` claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Allowed clock skew in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// Production requires a secret of at least 32 bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort(MIN_SECRET_LEN));
        }
        if self.audience.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_AUDIENCE"));
        }
        Ok(())
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_leeway() -> u64 {
    30
}
