//! Campaign aggregate.

use serde::Serialize;

use super::{CampaignError, CampaignStatus};
use crate::domain::foundation::{
    CampaignId, ProfileId, StateMachine, Timestamp, ValidationError,
};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_ALLOCATION: i64 = 1_000_000_000;
const MAX_URL_LEN: usize = 2048;

/// A campaign and its credit budget.
///
/// Invariant: `0 <= spent_credits <= allocated_credits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub owner_id: ProfileId,
    pub name: String,
    pub target_url: Option<String>,
    pub status: CampaignStatus,
    pub allocated_credits: i64,
    pub spent_credits: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Validated request to create and fund a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub owner_id: ProfileId,
    pub name: String,
    pub target_url: Option<String>,
    pub allocated_credits: i64,
}

impl NewCampaign {
    pub fn new(
        owner_id: ProfileId,
        name: &str,
        target_url: Option<String>,
        allocated_credits: i64,
    ) -> Result<Self, CampaignError> {
        let name = validate_name(name)?;
        let target_url = target_url
            .map(|url| validate_target_url(&url))
            .transpose()?;
        if !(1..=MAX_ALLOCATION).contains(&allocated_credits) {
            return Err(ValidationError::out_of_range(
                "allocated_credits",
                1,
                MAX_ALLOCATION,
                allocated_credits,
            )
            .into());
        }

        Ok(Self {
            owner_id,
            name,
            target_url,
            allocated_credits,
        })
    }
}

/// Partial update of a campaign. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignUpdate {
    pub name: Option<String>,
    pub target_url: Option<String>,
    pub status: Option<CampaignStatus>,
    pub spent_credits: Option<i64>,
}

impl CampaignUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.target_url.is_none()
            && self.status.is_none()
            && self.spent_credits.is_none()
    }
}

impl Campaign {
    /// Creates the campaign, debiting `available` credits.
    ///
    /// Returns `InsufficientCredits` when the owner cannot cover the allocation.
    pub fn fund(new: NewCampaign, available: i64) -> Result<Self, CampaignError> {
        if available < new.allocated_credits {
            return Err(CampaignError::InsufficientCredits {
                required: new.allocated_credits,
                available,
            });
        }

        let now = Timestamp::now();
        Ok(Self {
            id: CampaignId::new(),
            owner_id: new.owner_id,
            name: new.name,
            target_url: new.target_url,
            status: CampaignStatus::Active,
            allocated_credits: new.allocated_credits,
            spent_credits: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn remaining_credits(&self) -> i64 {
        self.allocated_credits - self.spent_credits
    }

    pub fn is_owned_by(&self, profile_id: &ProfileId) -> bool {
        &self.owner_id == profile_id
    }

    /// Applies an update all-or-nothing.
    ///
    /// Every field is validated before anything is written, so a rejected
    /// update leaves the campaign untouched.
    pub fn apply(&mut self, update: CampaignUpdate) -> Result<(), CampaignError> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        let target_url = update
            .target_url
            .as_deref()
            .map(validate_target_url)
            .transpose()?;
        let status = update
            .status
            .map(|target| self.status.transition_to(target))
            .transpose()?;

        if let Some(requested) = update.spent_credits {
            if requested < self.spent_credits {
                return Err(CampaignError::SpendDecrease {
                    current: self.spent_credits,
                    requested,
                });
            }
            if requested > self.allocated_credits {
                return Err(CampaignError::SpendExceedsAllocation {
                    allocated: self.allocated_credits,
                    requested,
                });
            }
            if requested != self.spent_credits && self.status == CampaignStatus::Completed {
                return Err(ValidationError::invalid_format(
                    "spent_credits",
                    "completed campaigns cannot spend credits",
                )
                .into());
            }
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(url) = target_url {
            self.target_url = Some(url);
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(spent) = update.spent_credits {
            self.spent_credits = spent;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::out_of_range(
            "name",
            1,
            MAX_NAME_LEN as i64,
            trimmed.chars().count() as i64,
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_target_url(url: &str) -> Result<String, ValidationError> {
    let trimmed = url.trim();
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(ValidationError::invalid_format(
            "target_url",
            "must be an http(s) URL",
        ));
    }
    if trimmed.len() > MAX_URL_LEN || trimmed.contains(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            "target_url",
            "must be a single URL of at most 2048 bytes",
        ));
    }
    Ok(trimmed.to_string())
}
