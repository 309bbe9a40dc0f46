//! HTTP routes.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{
    disable_push_token, get_order, get_preferences, health, list_notifications,
    mark_notification_read, payment_webhook, reconcile_payout, register_push_token,
    update_order_status, update_preferences,
};
use super::AppState;

/// Creates the application router with all endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/payments/webhook", post(payment_webhook))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
        .route("/orders/:id/payout/reconcile", post(reconcile_payout))
        .route("/push-tokens", post(register_push_token))
        .route("/push-tokens/:token", delete(disable_push_token))
        .route(
            "/notification-preferences/:kind/:subject_id",
            get(get_preferences).put(update_preferences),
        )
        .route(
            "/notification-history/:kind/:subject_id",
            get(list_notifications),
        )
        .route("/notifications/:id/read", post(mark_notification_read))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
