//! Stripe adapters.
//!
//! Implements the `TransferGateway` port against Stripe Connect transfers.
//!
//! # Configuration
//!
//! - `ORDER_SETTLEMENT__PAYMENT__SECRET_KEY`: Stripe secret API key
//! - `ORDER_SETTLEMENT__PAYMENT__API_BASE_URL`: override for stripe-mock

mod mock_transfer_gateway;
mod transfer_adapter;

pub use mock_transfer_gateway::MockTransferGateway;
pub use transfer_adapter::{StripeTransferAdapter, StripeTransferConfig};
