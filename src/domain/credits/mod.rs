//! Credits - ledger entries, grants and the purchasable catalog.

mod catalog;
mod errors;
mod transaction;

pub use catalog::{BillingInterval, CreditPackage, Plan, CREDIT_PACKAGES, PLANS};
pub use errors::CreditError;
pub use transaction::{CreditGrant, CreditTransaction, GrantOutcome, TransactionKind};
