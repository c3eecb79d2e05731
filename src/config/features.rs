//! Feature flags configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeatureFlags {
    /// Mount `GET /api/debug/campaigns`
    #[serde(default)]
    pub debug_routes: bool,

    /// Put internal error causes in 500 responses (disable in production!)
    #[serde(default)]
    pub verbose_errors: bool,
}

impl FeatureFlags {
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && self.verbose_errors {
            return Err(ValidationError::FeatureNotAllowedInProduction("verbose_errors"));
        }
        Ok(())
    }
}
