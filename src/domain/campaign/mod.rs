//! Campaign aggregate - a promoted item funded from its owner's credits.

mod aggregate;
mod errors;
mod status;

pub use aggregate::{Campaign, CampaignUpdate, NewCampaign, MAX_ALLOCATION, MAX_NAME_LEN};
pub use errors::CampaignError;
pub use status::CampaignStatus;
