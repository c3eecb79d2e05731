use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    cancel_subscription, create_subscription, get_subscription, upgrade_subscription,
};
use crate::adapters::http::state::AppState;

pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            get(get_subscription).post(create_subscription),
        )
        .route("/subscriptions/upgrade", post(upgrade_subscription))
        .route("/subscriptions/cancel", post(cancel_subscription))
}
