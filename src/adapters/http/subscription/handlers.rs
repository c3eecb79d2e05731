//! HTTP handlers for subscription endpoints.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::dto::{CancelRequest, SubscribeRequest, UpgradeRequest};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::ApiJson;
use crate::adapters::http::middleware::{CurrentProfile, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::subscription::{
    CancelSubscriptionCommand, CreateSubscriptionCommand, GetSubscriptionQuery,
    UpgradeSubscriptionCommand,
};

/// GET /api/subscriptions - `null` when the caller has none.
pub async fn get_subscription(
    State(state): State<AppState>,
    CurrentProfile(profile): CurrentProfile,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery {
            profile_id: profile.id,
        })
        .await?;
    Ok(Json(subscription))
}

/// POST /api/subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = CurrentProfile::resolve(&state, user).await?;
    let result = state
        .create_subscription_handler()
        .handle(CreateSubscriptionCommand {
            caller,
            plan_id: request.plan_id,
            payment_method_id: request.payment_method_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /api/subscriptions/upgrade
pub async fn upgrade_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<UpgradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = CurrentProfile::resolve(&state, user).await?;
    let result = state
        .upgrade_subscription_handler()
        .handle(UpgradeSubscriptionCommand {
            profile_id: profile.id,
            plan_id: request.plan_id,
        })
        .await?;
    Ok(Json(result))
}

/// POST /api/subscriptions/cancel
pub async fn cancel_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<CancelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = CurrentProfile::resolve(&state, user).await?;
    let subscription = state
        .cancel_subscription_handler()
        .handle(CancelSubscriptionCommand {
            profile_id: profile.id,
            immediate: request.immediate,
        })
        .await?;
    Ok(Json(subscription))
}
