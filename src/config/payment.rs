//! Payment configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    /// Stripe REST base URL, overridable for stripe-mock
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Ignore webhook events that are not in live mode
    #[serde(default)]
    pub require_livemode: bool,

    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Stripe price ids keyed by plan id (`starter`, `growth`, `scale`)
    #[serde(default)]
    pub price_ids: std::collections::HashMap<String, String>,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if *environment == Environment::Production && self.is_test_mode() {
            return Err(ValidationError::TestKeyInProduction);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            api_base: default_api_base(),
            require_livemode: false,
            timeout_secs: default_timeout(),
            price_ids: Default::default(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_timeout() -> u64 {
    30
}
