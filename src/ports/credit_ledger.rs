//! CreditLedger port - the only path by which payments become credits.

use async_trait::async_trait;

use crate::domain::credits::{CreditGrant, CreditTransaction, GrantOutcome};
use crate::domain::foundation::{DomainError, ProfileId};

#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Applies a grant exactly once per payment reference.
    ///
    /// Implementations lock the profile, insert the ledger row keyed on the
    /// reference, and only then add to the balance. A reference that is
    /// already in the ledger yields `GrantOutcome::Duplicate` and leaves the
    /// balance untouched. An unknown profile fails with `ProfileNotFound`.
    async fn grant(&self, grant: &CreditGrant) -> Result<GrantOutcome, DomainError>;

    /// Newest first.
    async fn list_for_profile(
        &self,
        profile_id: &ProfileId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CreditTransaction>, DomainError>;
}
