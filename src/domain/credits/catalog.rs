//! Fixed catalog of subscription plans and one-time credit packages.

use serde::Serialize;

use super::CreditError;

/// Billing cadence of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Month,
    Year,
}

/// Subscription plan. Configuration data, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    pub price_cents: i64,
    pub interval: BillingInterval,
    /// Credits granted per paid invoice.
    pub credits: i64,
    /// Orders plans for upgrades.
    pub rank: u8,
}

pub const PLANS: [Plan; 3] = [
    Plan {
        id: "starter",
        name: "Starter",
        price_cents: 1_900,
        interval: BillingInterval::Month,
        credits: 1_000,
        rank: 1,
    },
    Plan {
        id: "growth",
        name: "Growth",
        price_cents: 4_900,
        interval: BillingInterval::Month,
        credits: 5_000,
        rank: 2,
    },
    Plan {
        id: "scale",
        name: "Scale",
        price_cents: 14_900,
        interval: BillingInterval::Month,
        credits: 20_000,
        rank: 3,
    },
];

impl Plan {
    pub fn find(id: &str) -> Result<&'static Plan, CreditError> {
        PLANS
            .iter()
            .find(|plan| plan.id == id)
            .ok_or_else(|| CreditError::UnknownPlan(id.to_string()))
    }

    /// Credits owed when moving from `self` to `target`.
    ///
    /// Only strictly higher ranks are upgrades.
    pub fn upgrade_credits(&self, target: &Plan) -> Result<i64, CreditError> {
        if target.rank <= self.rank {
            return Err(CreditError::NotAnUpgrade {
                from: self.id.to_string(),
                to: target.id.to_string(),
            });
        }
        Ok(target.credits - self.credits)
    }
}

/// One-time credit purchase option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditPackage {
    pub id: &'static str,
    pub credits: i64,
    pub price_cents: i64,
}

pub const CREDIT_PACKAGES: [CreditPackage; 3] = [
    CreditPackage {
        id: "small",
        credits: 500,
        price_cents: 1_000,
    },
    CreditPackage {
        id: "medium",
        credits: 2_500,
        price_cents: 4_500,
    },
    CreditPackage {
        id: "large",
        credits: 10_000,
        price_cents: 15_000,
    },
];

impl CreditPackage {
    pub fn find(id: &str) -> Result<&'static CreditPackage, CreditError> {
        CREDIT_PACKAGES
            .iter()
            .find(|package| package.id == id)
            .ok_or_else(|| CreditError::UnknownPackage(id.to_string()))
    }
}
