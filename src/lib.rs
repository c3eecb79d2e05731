//! campaign-credits - credit-funded campaign tracking.
//!
//! Profiles buy credits (one-time packages or plan subscriptions through
//! Stripe), fund campaigns from their balance and record visits against
//! those campaigns. Every balance change goes through an append-only
//! ledger; grants are keyed on the payment reference so a replayed
//! payment or webhook never credits twice.
//!
//! Layout follows ports and adapters:
//! - `domain` - aggregates, invariants and error types
//! - `ports` - repository and external service traits
//! - `application` - command and query handlers
//! - `adapters` - Postgres, Stripe, auth, in-memory and HTTP
//! - `config` - layered configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
