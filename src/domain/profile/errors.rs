//! Profile-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(ProfileId),

    #[error("Administrator role required")]
    AdminRequired,

    #[error("Not allowed to promote profile {0}")]
    PromotionForbidden(ProfileId),
}

impl ProfileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProfileError::NotFound(_) => ErrorCode::ProfileNotFound,
            ProfileError::AdminRequired | ProfileError::PromotionForbidden(_) => {
                ErrorCode::Forbidden
            }
        }
    }
}

impl From<ProfileError> for DomainError {
    fn from(err: ProfileError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
