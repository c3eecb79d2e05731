//! Campaign handlers.
//!
//! ## Commands
//! - Creating a funded campaign
//! - Updating an owned campaign
//!
//! ## Queries
//! - Own campaigns, all campaigns (admin) and the debug dump

mod create_campaign;
mod list_campaigns;
mod update_campaign;

pub use create_campaign::{CreateCampaignCommand, CreateCampaignHandler};
pub use list_campaigns::{ListAllCampaignsQuery, ListCampaignsHandler, ListCampaignsQuery};
pub use update_campaign::{UpdateCampaignCommand, UpdateCampaignHandler};
