//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum routes for the webhook and the internal API
//! - `postgres` - PostgreSQL storage
//! - `memory` - In-memory storage for development and tests
//! - `stripe` - Payee transfers
//! - `push` - Expo push delivery
//! - `tasks` - Bounded side-effect queue and its workers

pub mod http;
pub mod memory;
pub mod postgres;
pub mod push;
pub mod stripe;
pub mod tasks;
