//! HTTP handlers for credit endpoints.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use super::dto::{PurchaseRequest, TransactionsParams};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::{ApiJson, ApiQuery};
use crate::adapters::http::middleware::{CurrentProfile, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::credits::{ListTransactionsQuery, PurchaseCreditsCommand};

/// GET /api/credits/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(params): ApiQuery<TransactionsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = CurrentProfile::resolve(&state, user).await?;
    let transactions = state
        .list_transactions_handler()
        .handle(ListTransactionsQuery {
            profile_id: profile.id,
            limit: params.limit,
            offset: params.offset,
        })
        .await?;
    Ok(Json(transactions))
}

/// POST /api/credits/purchase
pub async fn purchase(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = CurrentProfile::resolve(&state, user).await?;
    let result = state
        .purchase_credits_handler()
        .handle(PurchaseCreditsCommand {
            caller,
            package_id: request.package_id,
            payment_method_id: request.payment_method_id,
            idempotency_key: request.idempotency_key,
        })
        .await?;
    Ok(Json(result))
}
