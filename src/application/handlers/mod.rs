//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

mod customer;

pub mod campaign;
pub mod credits;
pub mod profile;
pub mod subscription;
pub mod visit;
pub mod webhook;
