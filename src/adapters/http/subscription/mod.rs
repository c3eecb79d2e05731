//! Subscription endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{CancelRequest, SubscribeRequest, UpgradeRequest};
pub use routes::subscription_routes;
