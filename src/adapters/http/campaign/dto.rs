//! Request bodies and query strings for campaign endpoints.

use serde::Deserialize;

use crate::domain::campaign::{CampaignStatus, CampaignUpdate};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    #[serde(default)]
    pub target_url: Option<String>,
    pub allocated_credits: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub target_url: Option<String>,
    pub status: Option<CampaignStatus>,
    pub spent_credits: Option<i64>,
}

impl From<UpdateCampaignRequest> for CampaignUpdate {
    fn from(request: UpdateCampaignRequest) -> Self {
        CampaignUpdate {
            name: request.name,
            target_url: request.target_url,
            status: request.status,
            spent_credits: request.spent_credits,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminCampaignsParams {
    /// One of `draft`, `active`, `paused`, `completed`.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
