//! Mock session validator for testing.
//!
//! ```ignore
//! use campaign_credits::adapters::auth::MockSessionValidator;
//!
//! let validator = MockSessionValidator::new().with_test_user("token-a");
//! let user = validator.validate("token-a").await?;
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, ProfileId};
use crate::ports::SessionValidator;

/// Maps tokens to users. Unknown tokens return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Returned for every validation while set.
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a token for a fresh profile id and returns the builder.
    pub fn with_test_user(self, token: impl Into<String>) -> Self {
        let token = token.into();
        let user = AuthenticatedUser::new(
            ProfileId::new(),
            format!("{}@test.example.com", token),
            Some(format!("Test User {}", token)),
        );
        self.with_user(token, user)
    }

    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), user);
    }

    /// User registered for `token`.
    pub fn user(&self, token: &str) -> Option<AuthenticatedUser> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        self.user(token).ok_or(AuthError::InvalidToken)
    }
}
