use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub plan_id: String,
    pub payment_method_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeRequest {
    pub plan_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelRequest {
    /// `false` cancels at the end of the paid period.
    #[serde(default)]
    pub immediate: bool,
}
