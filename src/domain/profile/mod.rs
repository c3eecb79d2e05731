//! Profile aggregate - application user with role and credit balance.

mod errors;
mod role;

pub use errors::ProfileError;
pub use role::Role;

use serde::Serialize;

use crate::domain::foundation::{DomainError, ProfileId, Timestamp};

/// Application user record.
///
/// `credits` is never negative. Every change to it goes through the
/// credit ledger or campaign funding, both of which lock the row first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: ProfileId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub credits: i64,
    pub stripe_customer_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    /// Builds the row created on first authenticated access.
    pub fn new(
        id: ProfileId,
        email: impl Into<String>,
        full_name: Option<String>,
        signup_credits: i64,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            email: email.into(),
            full_name,
            role: Role::User,
            credits: signup_credits.max(0),
            stripe_customer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this profile may promote `target` to admin.
    ///
    /// Admins may promote anyone. Everyone else may only promote
    /// themselves, and only while self promotion is enabled.
    pub fn can_promote(&self, target: &ProfileId, allow_self_promotion: bool) -> bool {
        self.is_admin() || (allow_self_promotion && &self.id == target)
    }

    /// Fails with `Forbidden` unless the profile is an admin.
    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ProfileError::AdminRequired.into())
        }
    }
}

/// Not-found error for a profile id.
pub fn profile_not_found(id: &ProfileId) -> DomainError {
    ProfileError::NotFound(*id).into()
}
