//! HTTP handlers for campaign endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::dto::{AdminCampaignsParams, CreateCampaignRequest, UpdateCampaignRequest};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::{ApiJson, ApiQuery};
use crate::adapters::http::middleware::{CurrentProfile, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::campaign::{
    CreateCampaignCommand, ListAllCampaignsQuery, ListCampaignsQuery, UpdateCampaignCommand,
};
use crate::domain::campaign::CampaignStatus;
use crate::domain::foundation::{CampaignId, DomainError};

/// GET /api/campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
    CurrentProfile(profile): CurrentProfile,
) -> Result<impl IntoResponse, ApiError> {
    let campaigns = state
        .list_campaigns_handler()
        .handle(ListCampaignsQuery {
            owner_id: profile.id,
        })
        .await?;
    Ok(Json(campaigns))
}

/// POST /api/campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<CreateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = CurrentProfile::resolve(&state, user).await?;
    let campaign = state
        .create_campaign_handler()
        .handle(CreateCampaignCommand {
            owner_id: profile.id,
            name: request.name,
            target_url: request.target_url,
            allocated_credits: request.allocated_credits,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// PATCH /api/campaigns/:id
pub async fn update_campaign(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let campaign_id: CampaignId = id
        .parse()
        .map_err(|_| DomainError::validation("id", "Invalid campaign id"))?;
    let profile = CurrentProfile::resolve(&state, user).await?;
    let campaign = state
        .update_campaign_handler()
        .handle(UpdateCampaignCommand {
            owner_id: profile.id,
            campaign_id,
            update: request.into(),
        })
        .await?;
    Ok(Json(campaign))
}

/// GET /api/admin/campaigns
pub async fn list_all_campaigns(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(params): ApiQuery<AdminCampaignsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<CampaignStatus>)
        .transpose()
        .map_err(DomainError::from)?;
    let caller = CurrentProfile::resolve(&state, user).await?;
    let campaigns = state
        .list_campaigns_handler()
        .handle_all(ListAllCampaignsQuery {
            caller,
            status,
            limit: params.limit,
            offset: params.offset,
        })
        .await?;
    Ok(Json(campaigns))
}

/// GET /api/debug/campaigns
pub async fn dump_campaigns(
    State(state): State<AppState>,
    CurrentProfile(caller): CurrentProfile,
) -> Result<impl IntoResponse, ApiError> {
    tracing::warn!(profile_id = %caller.id, "debug campaign dump requested");
    let campaigns = state.list_campaigns_handler().dump().await?;
    Ok(Json(campaigns))
}
