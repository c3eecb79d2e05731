//! Stripe webhook signature verification.
//!
//! HMAC-SHA256 over `"{timestamp}.{payload}"`, compared in constant time,
//! with a replay window on the signed timestamp.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<hex>[,v1=<hex>][,v0=<hex>]`.
    ///
    /// Stripe sends several `v1` entries while a secret is being rolled;
    /// any of them may match. `v0` and unknown keys are skipped.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifies signed webhook deliveries and parses the event.
pub struct StripeWebhookVerifier {
    secret: SecretString,
    require_livemode: bool,
}

impl StripeWebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            require_livemode: false,
        }
    }

    /// When set, verified test-mode events come back as
    /// [`WebhookError::Ignored`].
    pub fn require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    /// Checks the signature against the raw body, then parses it.
    ///
    /// # Errors
    ///
    /// - `ParseError` - malformed header or body
    /// - `TimestampOutOfRange` - signed more than five minutes ago
    /// - `InvalidTimestamp` - signed in the future beyond skew
    /// - `InvalidSignature` - no `v1` entry matches
    /// - `Ignored` - test-mode event while live mode is required
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        validate_timestamp(header.timestamp, chrono::Utc::now().timestamp())?;

        let expected = compute_signature(self.secret.expose_secret(), header.timestamp, payload)?;
        if !header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate))
        {
            return Err(WebhookError::InvalidSignature);
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        if self.require_livemode && !event.is_live() {
            return Err(WebhookError::Ignored(format!(
                "test mode event {} rejected in live mode",
                event.id
            )));
        }

        Ok(event)
    }
}

fn validate_timestamp(timestamp: i64, now: i64) -> Result<(), WebhookError> {
    let age = now - timestamp;

    if age > MAX_EVENT_AGE_SECS {
        return Err(WebhookError::TimestampOutOfRange);
    }
    if age < -MAX_CLOCK_SKEW_SECS {
        return Err(WebhookError::InvalidTimestamp);
    }

    Ok(())
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a `Stripe-Signature` header value for `payload`.
///
/// Used by tests and local tooling that replays events.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
}
