//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Webhook intake and order commands run on the request path; payouts and
//! notification dispatch run on the side-effect workers.

pub mod handlers;

pub use handlers::{
    // Webhook
    HandlePaymentWebhookHandler, WebhookOutcome,
    // Orders
    GetOrderHandler, MaterializeOrderCommand, MaterializeOrderHandler, MaterializeOrderResult,
    UpdateOrderStatusCommand, UpdateOrderStatusHandler,
    // Payouts
    PayoutSettings, ReconcilePayoutHandler, TransferPayoutCommand, TransferPayoutHandler,
    TransferPayoutResult,
    // Notifications
    DispatchNotificationHandler, DisablePushTokenHandler, GetPreferencesHandler,
    ListNotificationsHandler, MarkNotificationReadHandler, RegisterPushTokenCommand,
    RegisterPushTokenHandler, UpdatePreferencesHandler,
};
