//! GetCatalogHandler - Plans and credit packages on sale.

use serde::Serialize;

use crate::domain::credits::{CreditPackage, Plan, CREDIT_PACKAGES, PLANS};

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub plans: Vec<Plan>,
    pub packages: Vec<CreditPackage>,
}

/// Lists the fixed catalog. Plans without a configured price are hidden.
pub struct GetCatalogHandler {
    priced_plans: Vec<String>,
}

impl GetCatalogHandler {
    pub fn new<I, S>(priced_plans: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            priced_plans: priced_plans.into_iter().map(Into::into).collect(),
        }
    }

    pub fn handle(&self) -> Catalog {
        Catalog {
            plans: PLANS
                .iter()
                .filter(|plan| self.priced_plans.iter().any(|id| id == plan.id))
                .copied()
                .collect(),
            packages: CREDIT_PACKAGES.to_vec(),
        }
    }
}
