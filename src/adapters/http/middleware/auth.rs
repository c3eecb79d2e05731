//! Authentication middleware and extractors for axum.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!          Handler → RequireAuth / CurrentProfile read it back
//! ```
//!
//! The middleware goes through the `SessionValidator` port, so tests run
//! it against `MockSessionValidator` unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::super::error::ApiError;
use super::super::state::AppState;
use crate::application::handlers::profile::EnsureProfileCommand;
use crate::domain::foundation::{AuthError, AuthenticatedUser, DomainError, ErrorCode};
use crate::domain::profile::Profile;
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Validates `Authorization: Bearer <token>` when present.
///
/// A missing header passes through so public routes keep working; a
/// header that fails validation is rejected with 401 here.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(AuthError::ServiceUnavailable(msg)) => {
            tracing::error!(error = %msg, "auth service unavailable");
            ApiError(DomainError::new(
                ErrorCode::ExternalServiceError,
                "Authentication service unavailable",
            ))
            .into_response()
        }
        Err(AuthError::TokenExpired) => ApiError::unauthorized("Token expired").into_response(),
        Err(AuthError::InvalidToken) => ApiError::unauthorized("Invalid token").into_response(),
    }
}

/// The validated caller. Rejects with 401 when no token was accepted.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// The caller's profile, created on first authenticated access.
///
/// Handlers that take a request body extract [`RequireAuth`] instead and
/// call [`CurrentProfile::resolve`] once the body has parsed, so a
/// rejected request never creates a profile.
#[derive(Debug, Clone)]
pub struct CurrentProfile(pub Profile);

impl CurrentProfile {
    pub async fn resolve(state: &AppState, user: AuthenticatedUser) -> Result<Profile, ApiError> {
        let profile = state
            .ensure_profile_handler()
            .handle(EnsureProfileCommand { user })
            .await?;
        Ok(profile)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentProfile {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        Self::resolve(state, user).await.map(CurrentProfile)
    }
}
