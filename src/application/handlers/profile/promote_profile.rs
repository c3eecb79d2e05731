//! PromoteProfileHandler - Grants the admin role and resets the test balance.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ProfileId};
use crate::domain::profile::{Profile, ProfileError};
use crate::ports::ProfileRepository;

/// Command to promote a profile to admin.
#[derive(Debug, Clone)]
pub struct PromoteProfileCommand {
    pub caller: Profile,
    /// Raw id from the request body.
    pub profile_id: Option<String>,
}

pub struct PromoteProfileHandler {
    profiles: Arc<dyn ProfileRepository>,
    admin_testing_credits: i64,
    allow_self_promotion: bool,
}

impl PromoteProfileHandler {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        admin_testing_credits: i64,
        allow_self_promotion: bool,
    ) -> Self {
        Self {
            profiles,
            admin_testing_credits,
            allow_self_promotion,
        }
    }

    pub async fn handle(&self, cmd: PromoteProfileCommand) -> Result<Profile, DomainError> {
        let raw = cmd
            .profile_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DomainError::validation("profile_id", "profile_id is required"))?;
        let target: ProfileId = raw
            .parse()
            .map_err(|_| DomainError::validation("profile_id", "profile_id must be a UUID"))?;

        if !cmd.caller.can_promote(&target, self.allow_self_promotion) {
            tracing::warn!(caller = %cmd.caller.id, target = %target, "promotion refused");
            return Err(ProfileError::PromotionForbidden(target).into());
        }

        let promoted = self
            .profiles
            .promote_to_admin(&target, self.admin_testing_credits)
            .await?;

        tracing::info!(caller = %cmd.caller.id, profile_id = %promoted.id, "profile promoted to admin");
        Ok(promoted)
    }
}
