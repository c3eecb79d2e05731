//! HTTP handlers for profile endpoints.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use super::dto::PromoteRequest;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::ApiJson;
use crate::adapters::http::middleware::{CurrentProfile, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::profile::PromoteProfileCommand;

/// GET /api/profile
pub async fn get_profile(CurrentProfile(profile): CurrentProfile) -> impl IntoResponse {
    Json(profile)
}

/// GET /api/plans
pub async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog_handler().handle())
}

/// POST /api/admin/promote
pub async fn promote(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<PromoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = CurrentProfile::resolve(&state, user).await?;
    let profile = state
        .promote_profile_handler()
        .handle(PromoteProfileCommand {
            caller,
            profile_id: request.profile_id,
        })
        .await?;
    Ok(Json(profile))
}
