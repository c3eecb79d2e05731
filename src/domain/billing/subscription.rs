//! Local mirror of a processor subscription.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::credits::{CreditError, Plan};
use crate::domain::foundation::{ProfileId, SubscriptionId, Timestamp, ValidationError};

/// Subscription status as tracked locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// First invoice not yet paid.
    Incomplete,
    Active,
    /// Renewal payment failed; the processor is retrying.
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    /// Maps a processor status string onto the local set.
    pub fn from_stripe(status: &str) -> Self {
        match status {
            "active" | "trialing" => SubscriptionStatus::Active,
            "past_due" | "unpaid" | "paused" => SubscriptionStatus::PastDue,
            "canceled" | "incomplete_expired" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Incomplete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incomplete" => Ok(SubscriptionStatus::Incomplete),
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

/// A profile's subscription. At most one per profile is not canceled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub profile_id: ProfileId,
    pub plan_id: String,
    pub stripe_subscription_id: String,
    /// Subscription item id; plan changes swap the price on this item.
    pub stripe_item_id: Option<String>,
    pub status: SubscriptionStatus,
    pub cancel_at_period_end: bool,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    pub fn new(
        profile_id: ProfileId,
        plan: &Plan,
        stripe_subscription_id: impl Into<String>,
        stripe_item_id: Option<String>,
        status: SubscriptionStatus,
        current_period_end: Option<Timestamp>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: SubscriptionId::new(),
            profile_id,
            plan_id: plan.id.to_string(),
            stripe_subscription_id: stripe_subscription_id.into(),
            stripe_item_id,
            status,
            cancel_at_period_end: false,
            current_period_end,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn plan(&self) -> Result<&'static Plan, CreditError> {
        Plan::find(&self.plan_id)
    }

    /// Not yet canceled.
    pub fn is_current(&self) -> bool {
        self.status != SubscriptionStatus::Canceled
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    pub fn change_plan(&mut self, plan: &Plan) {
        self.plan_id = plan.id.to_string();
        self.updated_at = Timestamp::now();
    }

    /// Copies processor-side state onto the local row.
    pub fn sync(
        &mut self,
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
        current_period_end: Option<Timestamp>,
    ) {
        self.status = status;
        self.cancel_at_period_end = cancel_at_period_end;
        if current_period_end.is_some() {
            self.current_period_end = current_period_end;
        }
        self.updated_at = Timestamp::now();
    }
}
