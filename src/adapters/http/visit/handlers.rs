//! HTTP handlers for visit endpoints.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::dto::{RecordVisitRequest, VisitsParams};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::{ApiJson, ApiQuery};
use crate::adapters::http::middleware::{CurrentProfile, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::visit::{
    GetAnalyticsQuery, ListVisitsQuery, RecordVisitCommand,
};
use crate::domain::foundation::{CampaignId, DomainError};

fn parse_campaign_id(raw: &str) -> Result<CampaignId, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::validation("campaign_id", "Invalid campaign id"))
}

/// POST /api/visits - public.
pub async fn record_visit(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecordVisitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = state
        .record_visit_handler()
        .handle(RecordVisitCommand {
            campaign_id: parse_campaign_id(&request.campaign_id)?,
            visitor_id: request.visitor_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

/// GET /api/visits?campaign_id=..&limit=..
pub async fn list_visits(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(params): ApiQuery<VisitsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let campaign_id = parse_campaign_id(&params.campaign_id)?;
    let caller = CurrentProfile::resolve(&state, user).await?;
    let visits = state
        .list_visits_handler()
        .handle(ListVisitsQuery {
            caller,
            campaign_id,
            limit: params.limit,
        })
        .await?;
    Ok(Json(visits))
}

/// GET /api/analytics
pub async fn analytics(
    State(state): State<AppState>,
    CurrentProfile(profile): CurrentProfile,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .analytics_handler()
        .handle(GetAnalyticsQuery {
            owner_id: profile.id,
        })
        .await?;
    Ok(Json(summary))
}
