//! EnsureProfileHandler - Resolves the caller's profile, creating it on first access.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, DomainError};
use crate::domain::profile::Profile;
use crate::ports::ProfileRepository;

/// Command to load or create the caller's profile.
#[derive(Debug, Clone)]
pub struct EnsureProfileCommand {
    pub user: AuthenticatedUser,
}

pub struct EnsureProfileHandler {
    profiles: Arc<dyn ProfileRepository>,
    signup_credits: i64,
}

impl EnsureProfileHandler {
    pub fn new(profiles: Arc<dyn ProfileRepository>, signup_credits: i64) -> Self {
        Self {
            profiles,
            signup_credits,
        }
    }

    pub async fn handle(&self, cmd: EnsureProfileCommand) -> Result<Profile, DomainError> {
        if let Some(existing) = self.profiles.find(&cmd.user.id).await? {
            return Ok(existing);
        }

        let profile = Profile::new(
            cmd.user.id,
            cmd.user.email,
            cmd.user.display_name,
            self.signup_credits,
        );
        let stored = self.profiles.ensure(&profile).await?;
        tracing::info!(profile_id = %stored.id, "profile created");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::ProfileId;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser::new(ProfileId::new(), "new@example.com", Some("New".into()))
    }

    #[tokio::test]
    async fn creates_profile_with_signup_credits() {
        let store = Arc::new(InMemoryStore::new());
        let handler = EnsureProfileHandler::new(store.clone(), 50);
        let user = user();

        let profile = handler
            .handle(EnsureProfileCommand { user: user.clone() })
            .await
            .unwrap();

        assert_eq!(profile.id, user.id);
        assert_eq!(profile.credits, 50);
        assert_eq!(profile.full_name.as_deref(), Some("New"));
    }

    #[tokio::test]
    async fn existing_profile_is_returned_unchanged() {
        let store = Arc::new(InMemoryStore::new());
        let user = user();
        let mut existing = Profile::new(user.id, "old@example.com", None, 0);
        existing.credits = 700;
        store.put_profile(existing).await;
        let handler = EnsureProfileHandler::new(store, 50);

        let profile = handler.handle(EnsureProfileCommand { user }).await.unwrap();

        assert_eq!(profile.email, "old@example.com");
        assert_eq!(profile.credits, 700);
    }
}
