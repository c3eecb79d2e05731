//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, error types and the authenticated caller.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CampaignId, ProfileId, SubscriptionId, TransactionId, VisitId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
