//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - in-process store for tests and local runs
//! - `postgres` - sqlx repositories
//! - `stripe` - payment processor client and mock
//! - `auth` - bearer token validators
//! - `http` - axum REST API

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
