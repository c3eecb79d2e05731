//! Subscription handlers.
//!
//! ## Commands
//! - Creating a subscription
//! - Upgrading to a higher plan
//! - Canceling
//!
//! ## Queries
//! - Current subscription

mod cancel_subscription;
mod create_subscription;
mod get_subscription;
mod upgrade_subscription;

pub use cancel_subscription::{CancelSubscriptionCommand, CancelSubscriptionHandler};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, SubscriptionChangeResult,
};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery};
pub use upgrade_subscription::{UpgradeSubscriptionCommand, UpgradeSubscriptionHandler};
