//! WebhookEventRepository port - dedup store for Stripe deliveries.
//!
//! Stripe redelivers on timeouts and non-2xx responses, and may deliver
//! the same event more than once even after a 2xx. Every event id is
//! recorded with its outcome so a replay can be acknowledged without
//! side effects.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ValidationError};

/// How processing of an event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Success,
    Ignored,
    /// Eligible for reprocessing on redelivery.
    Failed,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Success => "success",
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for WebhookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookOutcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(WebhookOutcome::Success),
            "ignored" => Ok(WebhookOutcome::Ignored),
            "failed" => Ok(WebhookOutcome::Failed),
            other => Err(ValidationError::invalid_format(
                "result",
                format!("unknown webhook outcome '{}'", other),
            )),
        }
    }
}

/// Record of a processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Stripe event ID (evt_xxx format).
    pub event_id: String,

    pub event_type: String,

    pub processed_at: DateTime<Utc>,

    pub result: WebhookOutcome,

    /// Failure cause or ignore reason.
    pub error_message: Option<String>,
}

impl WebhookEventRecord {
    fn new(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        result: WebhookOutcome,
        error_message: Option<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            result,
            error_message,
        }
    }

    pub fn success(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self::new(event_id, event_type, WebhookOutcome::Success, None)
    }

    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(event_id, event_type, WebhookOutcome::Ignored, Some(reason.into()))
    }

    pub fn failed(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::new(event_id, event_type, WebhookOutcome::Failed, Some(error.into()))
    }
}

/// Result of attempting to save a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Stored. Either the first record for the event or a replacement of
    /// a failed one.
    Inserted,
    /// A successful or ignored record already exists.
    AlreadyExists,
}

/// Port for storing and retrieving processed webhook events.
///
/// Implementations must make `save` atomic per event id (primary key plus
/// a conditional upsert) so concurrent deliveries cannot both win.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Inserts the record, or replaces an existing record whose outcome is
    /// `Failed`. Returns `AlreadyExists` otherwise.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;
}

/// Result of webhook processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResult {
    Processed,
    /// Replay of an event that already succeeded or was ignored.
    AlreadyProcessed,
}
