//! Credit bookkeeping configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Credit bookkeeping knobs
#[derive(Debug, Clone, Deserialize)]
pub struct CreditsConfig {
    /// Balance an admin is set to on promotion
    #[serde(default = "default_admin_testing_credits")]
    pub admin_testing_credits: i64,

    /// Let a regular user promote their own profile
    #[serde(default = "default_allow_self_promotion")]
    pub allow_self_promotion: bool,

    /// Balance of a newly created profile
    #[serde(default)]
    pub signup_credits: i64,
}

impl CreditsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.admin_testing_credits < 0 {
            return Err(ValidationError::InvalidCredits("admin_testing_credits"));
        }
        if self.signup_credits < 0 {
            return Err(ValidationError::InvalidCredits("signup_credits"));
        }
        Ok(())
    }
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            admin_testing_credits: default_admin_testing_credits(),
            allow_self_promotion: default_allow_self_promotion(),
            signup_credits: 0,
        }
    }
}

fn default_admin_testing_credits() -> i64 {
    10_000
}

fn default_allow_self_promotion() -> bool {
    true
}
