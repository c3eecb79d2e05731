//! Profile, catalog and admin promotion endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::PromoteRequest;
pub use routes::profile_routes;
