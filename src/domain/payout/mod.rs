//! Payout domain module.
//!
//! Fee computation and the payee-facing view used when splitting a settled
//! amount between the platform and a vendor.

mod errors;
mod fee;
mod payee;

pub use errors::PayoutError;
pub use fee::{FeeRate, PayoutSplit};
pub use payee::PayeeAccount;
