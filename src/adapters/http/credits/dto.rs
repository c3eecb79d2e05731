use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionsParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub package_id: String,
    pub payment_method_id: String,
    /// Reuse on client retries to avoid a second charge.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}
