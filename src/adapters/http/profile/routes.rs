use axum::routing::{get, post};
use axum::Router;

use super::handlers::{get_catalog, get_profile, promote};
use crate::adapters::http::state::AppState;

/// - `GET /profile` - caller's profile (created on first access)
/// - `GET /plans` - public catalog
/// - `POST /admin/promote` - admin promotion
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/plans", get(get_catalog))
        .route("/admin/promote", post(promote))
}
