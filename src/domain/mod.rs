//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `order` - Order ledger model: line items, totals, promo codes, lifecycle
//! - `payout` - Platform fee split and payee accounts
//! - `notification` - Push tokens, preferences, messages and history
//! - `webhook` - Signature verification and the payment event envelope

pub mod foundation;
pub mod notification;
pub mod order;
pub mod payout;
pub mod webhook;
