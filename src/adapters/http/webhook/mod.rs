//! Stripe webhook endpoint.
//!
//! Authenticated by signature, not by bearer token. The raw body is
//! needed for verification, so it is taken as `Bytes`.

mod handlers;
mod routes;

pub use routes::webhook_routes;
