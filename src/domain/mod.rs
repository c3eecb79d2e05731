//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, caller identity)
//! - `profile` - Users, roles and promotion rules
//! - `campaign` - Campaign aggregate and its budget invariants
//! - `credits` - Ledger entries, grants and the plan/package catalog
//! - `visit` - Visit events and analytics summaries
//! - `billing` - Subscriptions and the Stripe webhook pipeline

pub mod billing;
pub mod campaign;
pub mod credits;
pub mod foundation;
pub mod profile;
pub mod visit;
