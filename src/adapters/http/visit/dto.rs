use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordVisitRequest {
    pub campaign_id: String,
    pub visitor_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisitsParams {
    pub campaign_id: String,
    pub limit: Option<i64>,
}
