//! Webhook error types.
//!
//! The status code decides whether Stripe redelivers: 2xx and 4xx are
//! final, 5xx is retried.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid signature")]
    InvalidSignature,

    /// Older than the replay window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Too far in the future.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    /// Acknowledged without processing.
    #[error("Event ignored: {0}")]
    Ignored(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_)
                | WebhookError::ProfileNotFound(_)
                | WebhookError::SubscriptionNotFound(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::Ignored(_) => StatusCode::OK,

            // Subscription rows are written by the create route, which
            // can race the first invoice events.
            WebhookError::ProfileNotFound(_)
            | WebhookError::SubscriptionNotFound(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ProfileNotFound => WebhookError::ProfileNotFound(err.message),
            ErrorCode::SubscriptionNotFound => WebhookError::SubscriptionNotFound(err.message),
            _ => WebhookError::Database(err.to_string()),
        }
    }
}
