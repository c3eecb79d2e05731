//! HTTP middleware for axum.
//!
//! - `auth` - bearer token validation and caller extractors

pub mod auth;

pub use auth::{auth_middleware, AuthState, CurrentProfile, RequireAuth};
