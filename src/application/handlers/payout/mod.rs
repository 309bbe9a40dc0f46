//! Payout handlers.

mod reconcile_payout;
mod transfer_payout;

pub use reconcile_payout::ReconcilePayoutHandler;
pub use transfer_payout::{
    PayoutSettings, TransferPayoutCommand, TransferPayoutHandler, TransferPayoutResult,
};
