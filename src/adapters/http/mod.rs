//! HTTP adapter - the axum REST API.
//!
//! Each area has its own module with `dto`, `handlers` and `routes`.
//! [`app_router`] merges them under `/api` and adds tracing, request ids,
//! timeouts and CORS.

pub mod campaign;
pub mod credits;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod profile;
pub mod router;
pub mod state;
pub mod subscription;
pub mod visit;
pub mod webhook;

pub use error::{ApiError, ErrorResponse};
pub use extract::{ApiJson, ApiQuery};
pub use router::app_router;
pub use state::{AppPorts, AppSettings, AppState};
