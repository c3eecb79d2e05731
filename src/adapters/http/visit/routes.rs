use axum::routing::get;
use axum::Router;

use super::handlers::{analytics, list_visits, record_visit};
use crate::adapters::http::state::AppState;

pub fn visit_routes() -> Router<AppState> {
    Router::new()
        .route("/visits", get(list_visits).post(record_visit))
        .route("/analytics", get(analytics))
}
