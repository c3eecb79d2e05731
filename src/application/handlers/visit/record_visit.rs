//! RecordVisitHandler - Public visit logging.

use std::sync::Arc;

use crate::domain::foundation::{CampaignId, DomainError};
use crate::domain::visit::Visit;
use crate::ports::VisitRepository;

#[derive(Debug, Clone)]
pub struct RecordVisitCommand {
    pub campaign_id: CampaignId,
    pub visitor_id: String,
}

pub struct RecordVisitHandler {
    visits: Arc<dyn VisitRepository>,
}

impl RecordVisitHandler {
    pub fn new(visits: Arc<dyn VisitRepository>) -> Self {
        Self { visits }
    }

    /// Every call inserts a row; repeated visits are not collapsed.
    pub async fn handle(&self, cmd: RecordVisitCommand) -> Result<Visit, DomainError> {
        let visit = Visit::new(cmd.campaign_id, &cmd.visitor_id)?;
        self.visits.record(&visit).await?;
        Ok(visit)
    }
}
