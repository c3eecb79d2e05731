use axum::routing::post;
use axum::Router;

use super::handlers::stripe_webhook;
use crate::adapters::http::state::AppState;

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/webhooks/stripe", post(stripe_webhook))
}
