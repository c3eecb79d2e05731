//! GetAnalyticsHandler - Visit and budget summary across the caller's campaigns.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ProfileId};
use crate::domain::visit::AnalyticsSummary;
use crate::ports::VisitRepository;

#[derive(Debug, Clone)]
pub struct GetAnalyticsQuery {
    pub owner_id: ProfileId,
}

pub struct GetAnalyticsHandler {
    visits: Arc<dyn VisitRepository>,
}

impl GetAnalyticsHandler {
    pub fn new(visits: Arc<dyn VisitRepository>) -> Self {
        Self { visits }
    }

    pub async fn handle(&self, query: GetAnalyticsQuery) -> Result<AnalyticsSummary, DomainError> {
        let stats = self.visits.stats_for_owner(&query.owner_id).await?;
        Ok(AnalyticsSummary::from_campaigns(stats))
    }
}
