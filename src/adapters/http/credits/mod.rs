//! Credit ledger and purchase endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{PurchaseRequest, TransactionsParams};
pub use routes::credit_routes;
