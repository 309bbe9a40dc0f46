//! HTTP handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::handlers::{RegisterPushTokenCommand, UpdateOrderStatusCommand};
use crate::domain::foundation::{NotificationId, OrderId, Subject, SubjectId, SubjectKind};
use crate::domain::notification::Platform;
use crate::domain::order::OrderStatus;

use super::dto::{
    ListNotificationsQuery, NotificationResponse, OrderResponse, PreferencesPatch,
    PushTokenResponse, ReconcileResponse, RegisterPushTokenRequest, UpdateOrderStatusRequest,
    WebhookAck,
};
use super::errors::{ApiError, WebhookRejection};
use super::AppState;

/// Header carrying `t=<unix>,v1=<hex>`.
pub const SIGNATURE_HEADER: &str = "x-signature";

// ════════════════════════════════════════════════════════════════════════════
// Webhook
// ════════════════════════════════════════════════════════════════════════════

/// POST /payments/webhook - Payment provider events
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.webhook.handle(&body, signature).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { received: true })).into_response(),
        Err(e) => WebhookRejection(e).into_response(),
    }
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════
// Orders
// ════════════════════════════════════════════════════════════════════════════

/// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.get_order.handle(parse_order_id(&order_id)?).await?;
    Ok(Json(order.into()))
}

/// PATCH /orders/:id/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let cmd = UpdateOrderStatusCommand {
        order_id: parse_order_id(&order_id)?,
        status: req.status.parse::<OrderStatus>()?,
    };
    let order = state.update_order_status.handle(cmd).await?;
    Ok(Json(order.into()))
}

/// POST /orders/:id/payout/reconcile
pub async fn reconcile_payout(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let result = state
        .reconcile_payout
        .handle(parse_order_id(&order_id)?)
        .await?;
    Ok(Json(result.into()))
}

// ════════════════════════════════════════════════════════════════════════════
// Push tokens
// ════════════════════════════════════════════════════════════════════════════

/// POST /push-tokens
pub async fn register_push_token(
    State(state): State<AppState>,
    Json(req): Json<RegisterPushTokenRequest>,
) -> Result<(StatusCode, Json<PushTokenResponse>), ApiError> {
    let cmd = RegisterPushTokenCommand {
        token: req.token,
        owner: parse_subject(&req.subject_kind, &req.subject_id)?,
        platform: req.platform.parse::<Platform>()?,
    };
    let token = state.register_push_token.handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(token.into())))
}

/// DELETE /push-tokens/:token
pub async fn disable_push_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.disable_push_token.handle(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════
// Preferences and history
// ════════════════════════════════════════════════════════════════════════════

/// GET /notification-preferences/:kind/:subject_id
pub async fn get_preferences(
    State(state): State<AppState>,
    Path((kind, subject_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let subject = parse_subject(&kind, &subject_id)?;
    let prefs = state.get_preferences.handle(&subject).await?;
    Ok(Json(prefs).into_response())
}

/// PUT /notification-preferences/:kind/:subject_id
pub async fn update_preferences(
    State(state): State<AppState>,
    Path((kind, subject_id)): Path<(String, String)>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Response, ApiError> {
    let subject = parse_subject(&kind, &subject_id)?;
    let current = state.get_preferences.handle(&subject).await?;
    let updated = state
        .update_preferences
        .handle(&subject, patch.apply_to(current))
        .await?;
    Ok(Json(updated).into_response())
}

/// GET /notification-history/:kind/:subject_id
pub async fn list_notifications(
    State(state): State<AppState>,
    Path((kind, subject_id)): Path<(String, String)>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let subject = parse_subject(&kind, &subject_id)?;
    let records = state.list_notifications.handle(&subject, query.limit).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = id
        .parse::<NotificationId>()
        .map_err(|_| ApiError::bad_request("Invalid notification ID"))?;
    state.mark_notification_read.handle(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════
// Path parsing
// ════════════════════════════════════════════════════════════════════════════

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse::<OrderId>()
        .map_err(|_| ApiError::bad_request("Invalid order ID"))
}

fn parse_subject(kind: &str, id: &str) -> Result<Subject, ApiError> {
    let kind = kind.parse::<SubjectKind>()?;
    let id = SubjectId::new(id)?;
    Ok(Subject::new(id, kind))
}
