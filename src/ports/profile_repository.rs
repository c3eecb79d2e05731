//! ProfileRepository port for profile persistence operations

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProfileId};
use crate::domain::profile::Profile;

/// Repository for application profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find(&self, id: &ProfileId) -> Result<Option<Profile>, DomainError>;

    /// Inserts `profile` unless a row with the same id exists, then returns
    /// the stored row. Concurrent first requests converge on one row.
    async fn ensure(&self, profile: &Profile) -> Result<Profile, DomainError>;

    async fn set_stripe_customer_id(
        &self,
        id: &ProfileId,
        customer_id: &str,
    ) -> Result<(), DomainError>;

    /// Sets the admin role and the balance to `credits` in one transaction,
    /// writing an adjustment ledger entry for the difference.
    ///
    /// Fails with `ProfileNotFound` if the profile does not exist.
    async fn promote_to_admin(&self, id: &ProfileId, credits: i64)
        -> Result<Profile, DomainError>;
}
