//! Plan change carried as processor subscription metadata.
//!
//! The upgrade route writes it together with the new price. Stripe copies
//! subscription metadata onto every invoice it creates afterwards
//! (`subscription_details.metadata`), so a proration invoice paid long
//! after the request still names the upgrade it settles.

use std::collections::HashMap;

use crate::domain::credits::{CreditError, Plan};

pub const UPGRADE_FROM_KEY: &str = "upgrade_from";
pub const UPGRADE_TO_KEY: &str = "upgrade_to";

/// A move to a strictly higher-ranked plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanChange {
    pub from: &'static Plan,
    pub to: &'static Plan,
}

impl PlanChange {
    pub fn upgrade(from: &'static Plan, to: &'static Plan) -> Result<Self, CreditError> {
        from.upgrade_credits(to)?;
        Ok(Self { from, to })
    }

    /// Credits owed for the change.
    pub fn credits(&self) -> i64 {
        self.to.credits - self.from.credits
    }

    pub fn description(&self) -> String {
        format!("Upgrade from {} to {}", self.from.name, self.to.name)
    }

    pub fn to_metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (UPGRADE_FROM_KEY.to_string(), self.from.id.to_string()),
            (UPGRADE_TO_KEY.to_string(), self.to.id.to_string()),
        ])
    }

    /// `Ok(None)` when the metadata names no plan change.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Result<Option<Self>, CreditError> {
        let (Some(from), Some(to)) = (metadata.get(UPGRADE_FROM_KEY), metadata.get(UPGRADE_TO_KEY))
        else {
            return Ok(None);
        };
        Self::upgrade(Plan::find(from)?, Plan::find(to)?).map(Some)
    }
}
