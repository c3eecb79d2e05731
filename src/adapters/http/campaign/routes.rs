use axum::routing::{get, patch};
use axum::Router;

use super::handlers::{
    create_campaign, dump_campaigns, list_all_campaigns, list_campaigns, update_campaign,
};
use crate::adapters::http::state::AppState;

/// - `GET /campaigns` - caller's campaigns, newest first
/// - `POST /campaigns` - create and fund
/// - `PATCH /campaigns/:id` - owner update
/// - `GET /admin/campaigns` - every campaign, admin only
pub fn campaign_routes() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/campaigns/:id", patch(update_campaign))
        .route("/admin/campaigns", get(list_all_campaigns))
}

/// `GET /debug/campaigns`; mounted only with `features.debug_routes`.
pub fn debug_routes() -> Router<AppState> {
    Router::new().route("/debug/campaigns", get(dump_campaigns))
}
