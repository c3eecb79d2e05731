//! Router assembly: every route group plus the cross-cutting layers.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::campaign::{campaign_routes, debug_routes};
use super::credits::credit_routes;
use super::error::expose_error_causes;
use super::middleware::auth_middleware;
use super::profile::profile_routes;
use super::state::AppState;
use super::subscription::subscription_routes;
use super::visit::visit_routes;
use super::webhook::webhook_routes;
use crate::config::ServerConfig;

/// Builds the full application router.
///
/// Bearer auth runs on every `/api` route except the webhook, which is
/// authenticated by its signature.
pub fn app_router(state: AppState, server: &ServerConfig) -> Router {
    let mut api = Router::new()
        .merge(profile_routes())
        .merge(campaign_routes())
        .merge(credit_routes())
        .merge(subscription_routes())
        .merge(visit_routes());
    if state.features.debug_routes {
        tracing::warn!("debug routes enabled");
        api = api.merge(debug_routes());
    }
    let api = api
        .layer(axum::middleware::from_fn_with_state(
            state.session_validator(),
            auth_middleware,
        ))
        .merge(webhook_routes());

    let verbose_errors = state.features.verbose_errors;
    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state);
    if verbose_errors {
        router = router.layer(axum::middleware::map_response(expose_error_causes));
    }

    let request_id = HeaderName::from_static("x-request-id");
    router
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors_layer(&server.cors_origins_list()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// No configured origins means any origin; bearer tokens are not cookies.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}
