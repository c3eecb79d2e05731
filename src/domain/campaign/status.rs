//! Campaign lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    /// Terminal. Budget is frozen.
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }
}

impl StateMachine for CampaignStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, target),
            (Draft, Active)
                | (Draft, Completed)
                | (Active, Paused)
                | (Active, Completed)
                | (Paused, Active)
                | (Paused, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CampaignStatus::*;
        match self {
            Draft => vec![Active, Completed],
            Active => vec![Paused, Completed],
            Paused => vec![Active, Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown campaign status '{}'", other),
            )),
        }
    }
}
