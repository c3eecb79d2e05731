//! Campaign-specific error types.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | InsufficientCredits | 402 |
//! | SpendExceedsAllocation | 400 |
//! | SpendDecrease | 400 |
//! | Validation | 400 |

use thiserror::Error;

use crate::domain::foundation::{CampaignId, DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CampaignError {
    #[error("Campaign not found: {0}")]
    NotFound(CampaignId),

    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Spent credits {requested} would exceed the allocation of {allocated}")]
    SpendExceedsAllocation { allocated: i64, requested: i64 },

    #[error("Spent credits cannot decrease (currently {current}, requested {requested})")]
    SpendDecrease { current: i64, requested: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CampaignError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CampaignError::NotFound(_) => ErrorCode::CampaignNotFound,
            CampaignError::InsufficientCredits { .. } => ErrorCode::InsufficientCredits,
            CampaignError::SpendExceedsAllocation { .. } => ErrorCode::SpendExceedsAllocation,
            CampaignError::SpendDecrease { .. } | CampaignError::Validation(_) => {
                ErrorCode::ValidationFailed
            }
        }
    }
}

impl From<CampaignError> for DomainError {
    fn from(err: CampaignError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match &err {
            CampaignError::InsufficientCredits {
                required,
                available,
            } => domain
                .with_detail("required", required.to_string())
                .with_detail("available", available.to_string()),
            CampaignError::Validation(v) => domain.with_detail("field", v.field()),
            CampaignError::SpendExceedsAllocation { .. } | CampaignError::SpendDecrease { .. } => {
                domain.with_detail("field", "spent_credits")
            }
            CampaignError::NotFound(_) => domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_credits_carries_amounts() {
        let err: DomainError = CampaignError::InsufficientCredits {
            required: 500,
            available: 20,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientCredits);
        assert_eq!(err.details.get("required"), Some(&"500".to_string()));
        assert_eq!(err.details.get("available"), Some(&"20".to_string()));
    }

    #[test]
    fn spend_errors_point_at_spent_credits() {
        let err: DomainError = CampaignError::SpendExceedsAllocation {
            allocated: 10,
            requested: 11,
        }
        .into();
        assert_eq!(err.code, ErrorCode::SpendExceedsAllocation);
        assert_eq!(err.details.get("field"), Some(&"spent_credits".to_string()));
    }
}
