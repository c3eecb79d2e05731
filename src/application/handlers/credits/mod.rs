//! Credit handlers.
//!
//! ## Commands
//! - Purchasing a credit package
//!
//! ## Queries
//! - Ledger listing

mod list_transactions;
mod purchase_credits;

pub use list_transactions::{ListTransactionsHandler, ListTransactionsQuery};
pub use purchase_credits::{PurchaseCreditsCommand, PurchaseCreditsHandler, PurchaseCreditsResult};
