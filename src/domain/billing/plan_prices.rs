//! Mapping between catalog plans and processor price ids.

use std::collections::HashMap;

use super::errors::SubscriptionError;
use crate::domain::credits::{Plan, PLANS};

/// Processor price id per plan id.
#[derive(Debug, Clone, Default)]
pub struct PlanPrices {
    prices: HashMap<String, String>,
}

impl PlanPrices {
    pub fn new(prices: HashMap<String, String>) -> Self {
        Self { prices }
    }

    pub fn price_for(&self, plan: &Plan) -> Result<&str, SubscriptionError> {
        self.prices
            .get(plan.id)
            .map(String::as_str)
            .filter(|price| !price.is_empty())
            .ok_or_else(|| SubscriptionError::PriceNotConfigured(plan.id.to_string()))
    }

    /// Reverse lookup for prices reported by webhooks.
    pub fn plan_for_price(&self, price_id: &str) -> Option<&'static Plan> {
        let plan_id = self
            .prices
            .iter()
            .find(|(_, price)| price.as_str() == price_id)
            .map(|(plan, _)| plan.as_str())?;
        PLANS.iter().find(|plan| plan.id == plan_id)
    }

    /// Plan ids that can be sold.
    pub fn priced_plan_ids(&self) -> Vec<&'static str> {
        PLANS
            .iter()
            .filter(|plan| self.price_for(plan).is_ok())
            .map(|plan| plan.id)
            .collect()
    }
}
