//! Typed view of the payment provider's event envelope.
//!
//! The body is parsed once at the boundary. Anything that does not fit the
//! expected shape of a completed checkout fails the whole event with
//! `MalformedPayload`; other event types are acknowledged and ignored.

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::foundation::SubjectId;
use crate::domain::order::LineItem;

use super::errors::WebhookError;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Outer event envelope: `{id?, type, data.object}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeData {
    pub object: serde_json::Value,
}

/// The checkout session object carried by `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Checkout metadata after schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub buyer_id: SubjectId,
    pub vendor_id: Option<SubjectId>,
    pub items: Vec<LineItem>,
    pub gift_items: Vec<LineItem>,
    pub promo_code: Option<String>,
    pub promo_discount: Option<i64>,
    pub delivery_fee: Option<i64>,
}

impl CheckoutMetadata {
    /// Parses the flat string map written at checkout time.
    ///
    /// Required: `buyerId`, `items`. Optional: `vendorId`, `giftItems`,
    /// `promoCode`, `promoDiscount`, `deliveryFee`. Blank optional values count
    /// as absent.
    pub fn from_map(metadata: &HashMap<String, String>) -> Result<Self, WebhookError> {
        let buyer_id = required(metadata, "buyerId")?;
        let buyer_id = SubjectId::new(buyer_id)
            .map_err(|e| WebhookError::malformed(format!("buyerId: {}", e)))?;

        let vendor_id = optional(metadata, "vendorId")
            .map(SubjectId::new)
            .transpose()
            .map_err(|e| WebhookError::malformed(format!("vendorId: {}", e)))?;

        let items = parse_items(required(metadata, "items")?, "items")?;
        let gift_items = optional(metadata, "giftItems")
            .map(|raw| parse_items(raw, "giftItems"))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            buyer_id,
            vendor_id,
            items,
            gift_items,
            promo_code: optional(metadata, "promoCode").map(str::to_string),
            promo_discount: parse_amount(metadata, "promoDiscount")?,
            delivery_fee: parse_amount(metadata, "deliveryFee")?,
        })
    }
}

/// A completed checkout, ready for the order ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub event_id: Option<String>,
    pub session_id: String,
    pub settled_amount: i64,
    pub payment_method: Option<String>,
    pub metadata: CheckoutMetadata,
}

/// What the ingress should do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    CheckoutCompleted(CompletedCheckout),
    /// Any other event type; acknowledged without side effects.
    Ignored { event_type: String },
}

/// Parses a raw webhook body.
pub fn parse_event(payload: &[u8]) -> Result<ParsedEvent, WebhookError> {
    let envelope: WebhookEnvelope = serde_json::from_slice(payload)
        .map_err(|e| WebhookError::malformed(format!("envelope: {}", e)))?;

    if envelope.event_type != CHECKOUT_SESSION_COMPLETED {
        return Ok(ParsedEvent::Ignored {
            event_type: envelope.event_type,
        });
    }

    let session: CheckoutSession = serde_json::from_value(envelope.data.object)
        .map_err(|e| WebhookError::malformed(format!("checkout session: {}", e)))?;
    if session.id.trim().is_empty() {
        return Err(WebhookError::malformed("checkout session id is empty"));
    }
    let settled_amount = session
        .amount_total
        .ok_or_else(|| WebhookError::malformed("amount_total is missing"))?;
    if settled_amount < 0 {
        return Err(WebhookError::malformed("amount_total is negative"));
    }
    let metadata = CheckoutMetadata::from_map(&session.metadata)?;

    Ok(ParsedEvent::CheckoutCompleted(CompletedCheckout {
        event_id: envelope.id,
        session_id: session.id,
        settled_amount,
        payment_method: session.payment_intent,
        metadata,
    }))
}

fn required<'a>(metadata: &'a HashMap<String, String>, key: &str) -> Result<&'a str, WebhookError> {
    optional(metadata, key).ok_or_else(|| WebhookError::malformed(format!("{} is missing", key)))
}

fn optional<'a>(metadata: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_items(raw: &str, key: &str) -> Result<Vec<LineItem>, WebhookError> {
    let items: Vec<LineItem> = serde_json::from_str(raw)
        .map_err(|e| WebhookError::malformed(format!("{}: {}", key, e)))?;
    for item in &items {
        item.validate()
            .map_err(|e| WebhookError::malformed(format!("{}: {}", key, e)))?;
    }
    Ok(items)
}

fn parse_amount(metadata: &HashMap<String, String>, key: &str) -> Result<Option<i64>, WebhookError> {
    let Some(raw) = optional(metadata, key) else {
        return Ok(None);
    };
    let value: i64 = raw
        .parse()
        .map_err(|_| WebhookError::malformed(format!("{} is not an integer", key)))?;
    if value < 0 {
        return Err(WebhookError::malformed(format!("{} is negative", key)));
    }
    Ok(Some(value))
}
