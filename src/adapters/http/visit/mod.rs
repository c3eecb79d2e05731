//! Visit tracking and analytics endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{RecordVisitRequest, VisitsParams};
pub use routes::visit_routes;
