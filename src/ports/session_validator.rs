//! Session validation port for bearer token validation.
//!
//! Implementations must check the signature, expiry and audience of the
//! token (and the issuer when one is configured) before mapping claims
//! to an [`AuthenticatedUser`].

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts the caller.
///
/// # Contract
///
/// - `AuthError::InvalidToken` for malformed tokens or bad signatures
/// - `AuthError::TokenExpired` for expired tokens
/// - `AuthError::ServiceUnavailable` for transient failures
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `token` is the raw JWT without the `Bearer ` prefix.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
