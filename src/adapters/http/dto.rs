//! HTTP DTOs.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::notification::{NotificationPreferences, NotificationRecord, PushToken};
use crate::domain::order::{LineItem, Order};
use crate::application::handlers::TransferPayoutResult;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPushTokenRequest {
    pub token: String,
    pub subject_id: String,
    pub subject_kind: String,
    pub platform: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body returned to the payment provider for every accepted event.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fee: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub session_id: String,
    pub buyer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    pub status: String,
    pub items: Vec<LineItem>,
    pub gift_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    pub promo_discount: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub settled_amount: i64,
    pub payout: PayoutResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            session_id: order.session_id,
            buyer_id: order.buyer_id.to_string(),
            vendor_id: order.payee_id.map(|p| p.to_string()),
            status: order.status.as_str().to_string(),
            items: order.items,
            gift_items: order.gift_items,
            promo_code: order.promo_code,
            promo_discount: order.promo_discount,
            delivery_fee: order.delivery_fee,
            total: order.total,
            settled_amount: order.settled_amount,
            payout: PayoutResponse {
                status: order.payout.status.as_str().to_string(),
                platform_fee: order.payout.platform_fee,
                payee_amount: order.payout.payee_amount,
                transfer_id: order.payout.transfer_id,
                failure_reason: order.payout.failure_reason,
            },
            created_at: order.created_at.as_datetime().to_rfc3339(),
            updated_at: order.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub transfer_id: String,
    pub payee_amount: i64,
    pub platform_fee: i64,
}

impl From<TransferPayoutResult> for ReconcileResponse {
    fn from(result: TransferPayoutResult) -> Self {
        Self {
            transfer_id: result.transfer_id,
            payee_amount: result.payee_amount,
            platform_fee: result.platform_fee,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenResponse {
    pub subject_id: String,
    pub subject_kind: String,
    pub platform: String,
    pub enabled: bool,
}

impl From<PushToken> for PushTokenResponse {
    fn from(token: PushToken) -> Self {
        Self {
            subject_id: token.owner.id.to_string(),
            subject_kind: token.owner.kind.as_str().to_string(),
            platform: token.platform.as_str().to_string(),
            enabled: token.enabled,
        }
    }
}

/// Preferences travel as-is; every field is optional on write so clients can
/// flip a single category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub orders: Option<bool>,
    pub messages: Option<bool>,
    pub reminders: Option<bool>,
    pub promotions: Option<bool>,
    pub consultations: Option<bool>,
}

impl PreferencesPatch {
    pub fn apply_to(&self, mut prefs: NotificationPreferences) -> NotificationPreferences {
        if let Some(v) = self.orders {
            prefs.orders = v;
        }
        if let Some(v) = self.messages {
            prefs.messages = v;
        }
        if let Some(v) = self.reminders {
            prefs.reminders = v;
        }
        if let Some(v) = self.promotions {
            prefs.promotions = v;
        }
        if let Some(v) = self.consultations {
            prefs.consultations = v;
        }
        prefs
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub sent_at: String,
    pub read: bool,
}

impl From<NotificationRecord> for NotificationResponse {
    fn from(record: NotificationRecord) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title,
            body: record.body,
            category: record.category.map(|c| c.as_str().to_string()),
            sent_at: record.sent_at.as_datetime().to_rfc3339(),
            read: record.read,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}
