//! HS256 JWT adapter for bearer token validation.
//!
//! Tokens are minted by the hosted auth service and signed with a shared
//! secret. The adapter checks:
//!
//! - **Signature**: HMAC-SHA256 with the configured secret
//! - **Expiry (exp)**: must be in the future, within the configured leeway
//! - **Audience (aud)**: must contain the configured audience
//! - **Issuer (iss)**: only when one is configured
//!
//! The `sub` claim must be a UUID; it becomes the caller's `ProfileId`.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, ProfileId};
use crate::ports::SessionValidator;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    name: Option<String>,

    /// Supabase-style tokens put the display name here.
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

/// Validates shared-secret JWTs.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.audience]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    tracing::warn!(error = %e, "Token issued for another party");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            }
        })?;
        let claims = data.claims;

        let profile_id: ProfileId = claims.sub.parse().map_err(|_| {
            tracing::warn!(sub = %claims.sub, "Token subject is not a UUID");
            AuthError::InvalidToken
        })?;

        let email = claims.email.filter(|e| !e.is_empty()).ok_or_else(|| {
            tracing::warn!("Token missing email claim");
            AuthError::InvalidToken
        })?;

        let display_name = claims
            .name
            .or_else(|| claims.user_metadata.and_then(|m| m.full_name));

        Ok(AuthenticatedUser::new(profile_id, email, display_name))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("audience", &self.validation.aud)
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}
