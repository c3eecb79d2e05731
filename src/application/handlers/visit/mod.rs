//! Visit handlers.
//!
//! ## Commands
//! - Recording a visit (public)
//!
//! ## Queries
//! - Visit log of a campaign
//! - Analytics summary

mod get_analytics;
mod list_visits;
mod record_visit;

pub use get_analytics::{GetAnalyticsHandler, GetAnalyticsQuery};
pub use list_visits::{ListVisitsHandler, ListVisitsQuery};
pub use record_visit::{RecordVisitCommand, RecordVisitHandler};
