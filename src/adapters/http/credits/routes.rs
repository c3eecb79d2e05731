use axum::routing::{get, post};
use axum::Router;

use super::handlers::{list_transactions, purchase};
use crate::adapters::http::state::AppState;

pub fn credit_routes() -> Router<AppState> {
    Router::new()
        .route("/credits/transactions", get(list_transactions))
        .route("/credits/purchase", post(purchase))
}
