//! Request bodies for profile endpoints.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PromoteRequest {
    /// Parsed by the handler, which reports a missing or malformed id
    /// against the `profile_id` field.
    #[serde(default)]
    pub profile_id: Option<String>,
}
