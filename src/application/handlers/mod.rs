//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, grouped by
//! area. Each handler holds its ports as `Arc<dyn Port>` and exposes a single
//! `handle` method.

pub mod notification;
pub mod order;
pub mod payout;
pub mod webhook;

pub use notification::{
    DispatchNotificationHandler, DisablePushTokenHandler, GetPreferencesHandler,
    ListNotificationsHandler, MarkNotificationReadHandler, RegisterPushTokenCommand,
    RegisterPushTokenHandler, UpdatePreferencesHandler,
};
pub use order::{
    GetOrderHandler, MaterializeOrderCommand, MaterializeOrderHandler, MaterializeOrderResult,
    UpdateOrderStatusCommand, UpdateOrderStatusHandler,
};
pub use payout::{
    PayoutSettings, ReconcilePayoutHandler, TransferPayoutCommand, TransferPayoutHandler,
    TransferPayoutResult,
};
pub use webhook::{HandlePaymentWebhookHandler, WebhookOutcome};
