//! Shared state for the HTTP router.

use std::sync::Arc;

use crate::application::handlers::{
    DisablePushTokenHandler, GetOrderHandler, GetPreferencesHandler, HandlePaymentWebhookHandler,
    ListNotificationsHandler, MarkNotificationReadHandler, ReconcilePayoutHandler,
    RegisterPushTokenHandler, UpdateOrderStatusHandler, UpdatePreferencesHandler,
};

/// Every request handler the routes dispatch to.
#[derive(Clone)]
pub struct AppState {
    pub webhook: Arc<HandlePaymentWebhookHandler>,
    pub get_order: Arc<GetOrderHandler>,
    pub update_order_status: Arc<UpdateOrderStatusHandler>,
    pub reconcile_payout: Arc<ReconcilePayoutHandler>,
    pub register_push_token: Arc<RegisterPushTokenHandler>,
    pub disable_push_token: Arc<DisablePushTokenHandler>,
    pub get_preferences: Arc<GetPreferencesHandler>,
    pub update_preferences: Arc<UpdatePreferencesHandler>,
    pub list_notifications: Arc<ListNotificationsHandler>,
    pub mark_notification_read: Arc<MarkNotificationReadHandler>,
}
