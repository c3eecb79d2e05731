//! API error responses.
//!
//! Every handler failure is a [`DomainError`]; [`ApiError`] maps its code
//! to a status and renders the standard error body.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// SCREAMING_SNAKE_CASE error code.
    pub error_code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(DomainError::new(ErrorCode::Unauthorized, message))
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.0.code)
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::InvalidCreditAmount
        | ErrorCode::SpendExceedsAllocation
        | ErrorCode::InvalidPlanChange => StatusCode::BAD_REQUEST,

        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,

        ErrorCode::NotFound
        | ErrorCode::ProfileNotFound
        | ErrorCode::CampaignNotFound
        | ErrorCode::SubscriptionNotFound
        | ErrorCode::UnknownPlan => StatusCode::NOT_FOUND,

        ErrorCode::InsufficientCredits | ErrorCode::PaymentRequired => {
            StatusCode::PAYMENT_REQUIRED
        }

        ErrorCode::AlreadySubscribed | ErrorCode::Conflict => StatusCode::CONFLICT,

        ErrorCode::PaymentFailed | ErrorCode::ExternalServiceError => StatusCode::BAD_GATEWAY,

        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Internal cause of a 500, attached to the response for
/// [`expose_error_causes`].
#[derive(Debug, Clone)]
struct ErrorCause(ErrorResponse);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_code = self.0.code.to_string();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error_code = %error_code, cause = %self.0.message, "request failed");
            let verbose = ErrorResponse::new(
                error_code.clone(),
                format!("{}: {}", INTERNAL_MESSAGE, self.0.message),
            );
            let mut response =
                (status, Json(ErrorResponse::new(error_code, INTERNAL_MESSAGE))).into_response();
            response.extensions_mut().insert(ErrorCause(verbose));
            return response;
        }

        if status.is_server_error() {
            tracing::warn!(error_code = %error_code, message = %self.0.message, "upstream failure");
        }

        let details = (!self.0.details.is_empty()).then_some(self.0.details);
        let body = ErrorResponse {
            error_code,
            message: self.0.message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

/// Response mapper that swaps generic 500 bodies for ones carrying the
/// cause. Mounted only when `features.verbose_errors` is on.
pub async fn expose_error_causes(response: Response) -> Response {
    match response.extensions().get::<ErrorCause>().cloned() {
        Some(ErrorCause(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}
