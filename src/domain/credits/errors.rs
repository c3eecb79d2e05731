//! Credit-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreditError {
    #[error("Credit amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Payment reference is required")]
    MissingReference,

    #[error("Unknown credit package: {0}")]
    UnknownPackage(String),

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Plan '{to}' is not an upgrade from '{from}'")]
    NotAnUpgrade { from: String, to: String },
}

impl CreditError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CreditError::InvalidAmount(_) | CreditError::MissingReference => {
                ErrorCode::InvalidCreditAmount
            }
            CreditError::UnknownPackage(_) | CreditError::UnknownPlan(_) => ErrorCode::UnknownPlan,
            CreditError::NotAnUpgrade { .. } => ErrorCode::InvalidPlanChange,
        }
    }
}

impl From<CreditError> for DomainError {
    fn from(err: CreditError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
