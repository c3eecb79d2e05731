//! Visits - append-only access events against a campaign.

use serde::Serialize;

use crate::domain::campaign::CampaignStatus;
use crate::domain::foundation::{CampaignId, Timestamp, ValidationError, VisitId};

const MAX_VISITOR_ID_LEN: usize = 200;

/// A recorded access event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visit {
    pub id: VisitId,
    pub campaign_id: CampaignId,
    pub visitor_id: String,
    pub created_at: Timestamp,
}

impl Visit {
    pub fn new(campaign_id: CampaignId, visitor_id: &str) -> Result<Self, ValidationError> {
        let visitor_id = visitor_id.trim();
        if visitor_id.is_empty() {
            return Err(ValidationError::empty_field("visitor_id"));
        }
        if visitor_id.len() > MAX_VISITOR_ID_LEN {
            return Err(ValidationError::out_of_range(
                "visitor_id",
                1,
                MAX_VISITOR_ID_LEN as i64,
                visitor_id.len() as i64,
            ));
        }
        Ok(Self {
            id: VisitId::new(),
            campaign_id,
            visitor_id: visitor_id.to_string(),
            created_at: Timestamp::now(),
        })
    }
}

/// Visit and budget figures for one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignStats {
    pub campaign_id: CampaignId,
    pub name: String,
    pub status: CampaignStatus,
    pub allocated_credits: i64,
    pub spent_credits: i64,
    pub total_visits: i64,
    pub unique_visitors: i64,
}

/// Per-campaign stats for one owner plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub campaigns: Vec<CampaignStats>,
    pub total_visits: i64,
    pub unique_visitors: i64,
    pub allocated_credits: i64,
    pub spent_credits: i64,
}

impl AnalyticsSummary {
    /// Totals are sums over campaigns. A visitor seen on two campaigns
    /// counts twice in `unique_visitors`.
    pub fn from_campaigns(campaigns: Vec<CampaignStats>) -> Self {
        let total_visits = campaigns.iter().map(|c| c.total_visits).sum();
        let unique_visitors = campaigns.iter().map(|c| c.unique_visitors).sum();
        let allocated_credits = campaigns.iter().map(|c| c.allocated_credits).sum();
        let spent_credits = campaigns.iter().map(|c| c.spent_credits).sum();
        Self {
            campaigns,
            total_visits,
            unique_visitors,
            allocated_credits,
            spent_credits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_requires_visitor_id() {
        assert_eq!(
            Visit::new(CampaignId::new(), " "),
            Err(ValidationError::empty_field("visitor_id"))
        );
    }

    #[test]
    fn visit_rejects_oversized_visitor_id() {
        let long = "v".repeat(201);
        assert!(Visit::new(CampaignId::new(), &long).is_err());
    }

    #[test]
    fn summary_sums_campaigns() {
        let stats = |visits, unique, spent| CampaignStats {
            campaign_id: CampaignId::new(),
            name: "c".into(),
            status: CampaignStatus::Active,
            allocated_credits: 100,
            spent_credits: spent,
            total_visits: visits,
            unique_visitors: unique,
        };
        let summary = AnalyticsSummary::from_campaigns(vec![stats(10, 4, 5), stats(3, 3, 1)]);
        assert_eq!(summary.total_visits, 13);
        assert_eq!(summary.unique_visitors, 7);
        assert_eq!(summary.allocated_credits, 200);
        assert_eq!(summary.spent_credits, 6);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = AnalyticsSummary::from_campaigns(vec![]);
        assert_eq!(summary.total_visits, 0);
        assert!(summary.campaigns.is_empty());
    }
}
