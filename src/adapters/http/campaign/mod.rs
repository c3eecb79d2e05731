//! Campaign endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{AdminCampaignsParams, CreateCampaignRequest, UpdateCampaignRequest};
pub use routes::{campaign_routes, debug_routes};
