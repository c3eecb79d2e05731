use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::state::AppState;
use crate::domain::billing::WebhookError;
use crate::ports::WebhookResult;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// POST /api/webhooks/stripe
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("webhook without signature header");
        return rejection(WebhookError::InvalidSignature);
    };

    let event = match state.webhook_verifier.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(WebhookError::Ignored(reason)) => {
            tracing::info!(%reason, "webhook ignored before processing");
            return acknowledged("ignored");
        }
        Err(err) => {
            tracing::warn!(error = %err, "webhook rejected");
            return rejection(err);
        }
    };

    match state.webhook_processor.process(&event).await {
        Ok(WebhookResult::Processed) => acknowledged("processed"),
        Ok(WebhookResult::AlreadyProcessed) => acknowledged("already_processed"),
        Err(err) => {
            tracing::error!(
                event_id = %event.id,
                event_type = %event.event_type,
                error = %err,
                retryable = err.is_retryable(),
                "webhook processing failed"
            );
            rejection(err)
        }
    }
}

fn acknowledged(status: &str) -> Response {
    (StatusCode::OK, Json(json!({ "status": status }))).into_response()
}

fn rejection(err: WebhookError) -> Response {
    let status = err.status_code();
    let (code, message) = match status {
        StatusCode::UNAUTHORIZED => ("INVALID_SIGNATURE", err.to_string()),
        StatusCode::BAD_REQUEST => ("INVALID_EVENT", err.to_string()),
        _ => ("WEBHOOK_FAILED", "Webhook processing failed".to_string()),
    };
    (status, Json(ErrorResponse::new(code, message))).into_response()
}
