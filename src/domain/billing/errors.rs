//! Subscription error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("No active subscription for profile {0}")]
    NotFound(ProfileId),

    #[error("Profile {0} already has an active subscription")]
    AlreadySubscribed(ProfileId),

    #[error("Subscription is {0}, expected active")]
    NotActive(String),

    /// The plan has no processor price configured.
    #[error("No price configured for plan '{0}'")]
    PriceNotConfigured(String),
}

impl SubscriptionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) => ErrorCode::SubscriptionNotFound,
            SubscriptionError::AlreadySubscribed(_) => ErrorCode::AlreadySubscribed,
            SubscriptionError::NotActive(_) => ErrorCode::InvalidPlanChange,
            SubscriptionError::PriceNotConfigured(_) => ErrorCode::InternalError,
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
