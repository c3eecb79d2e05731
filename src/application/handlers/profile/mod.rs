//! Profile handlers.
//!
//! ## Commands
//! - Ensuring the caller's profile exists
//! - Promoting a profile to admin
//!
//! ## Queries
//! - Plan and package catalog

mod ensure_profile;
mod get_catalog;
mod promote_profile;

pub use ensure_profile::{EnsureProfileCommand, EnsureProfileHandler};
pub use get_catalog::{Catalog, GetCatalogHandler};
pub use promote_profile::{PromoteProfileCommand, PromoteProfileHandler};
