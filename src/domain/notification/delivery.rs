//! Push messages, gateway tickets and dispatch outcomes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Subject;

use super::NotificationCategory;

/// Ticket error codes after which a token will never work again.
const PERMANENT_TOKEN_ERRORS: [&str; 2] = ["DeviceNotRegistered", "InvalidCredentials"];

/// A notification addressed to a subject, before token resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Subject,
    pub title: String,
    pub body: String,
    pub category: Option<NotificationCategory>,
    pub data: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(recipient: Subject, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipient,
            title: title.into(),
            body: body.into(),
            category: None,
            data: None,
        }
    }

    pub fn in_category(mut self, category: NotificationCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushPriority {
    Default,
    Normal,
    High,
}

/// One message in a batched gateway request; one per device token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub sound: String,
    pub priority: PushPriority,
}

impl PushMessage {
    pub fn for_token(token: impl Into<String>, notification: &Notification) -> Self {
        Self {
            to: token.into(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            data: notification.data.clone(),
            sound: "default".to_string(),
            priority: PushPriority::High,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDetails {
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-message result from the push gateway, aligned with the request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTicket {
    pub status: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<TicketDetails>,
}

/// What a ticket means for the token it was sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketOutcome {
    Delivered,
    /// The token is dead and must be disabled.
    PermanentlyInvalid { error: String },
    /// Worth logging, nothing to evict.
    Failed { message: String },
}

impl DeliveryTicket {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            id: None,
            message: None,
            details: None,
        }
    }

    pub fn error(message: impl Into<String>, error: Option<&str>) -> Self {
        Self {
            status: "error".to_string(),
            id: None,
            message: Some(message.into()),
            details: Some(TicketDetails {
                error: error.map(str::to_string),
            }),
        }
    }

    pub fn classify(&self) -> TicketOutcome {
        if self.status == "ok" {
            return TicketOutcome::Delivered;
        }
        let code = self.details.as_ref().and_then(|d| d.error.as_deref());
        match code {
            Some(code) if PERMANENT_TOKEN_ERRORS.contains(&code) => {
                TicketOutcome::PermanentlyInvalid {
                    error: code.to_string(),
                }
            }
            _ => TicketOutcome::Failed {
                message: self
                    .message
                    .clone()
                    .or_else(|| code.map(str::to_string))
                    .unwrap_or_else(|| self.status.clone()),
            },
        }
    }
}

/// Result of one dispatch invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Whether a gateway request was made
    pub attempted: bool,
    /// Number of tokens the gateway accepted
    pub delivered: usize,
}

impl DispatchOutcome {
    pub fn skipped() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubjectId;

    #[test]
    fn ok_ticket_is_delivered() {
        assert_eq!(DeliveryTicket::ok().classify(), TicketOutcome::Delivered);
    }

    #[test]
    fn device_not_registered_is_permanent() {
        let ticket = DeliveryTicket::error("gone", Some("DeviceNotRegistered"));
        assert_eq!(
            ticket.classify(),
            TicketOutcome::PermanentlyInvalid {
                error: "DeviceNotRegistered".to_string()
            }
        );
        let ticket = DeliveryTicket::error("bad creds", Some("InvalidCredentials"));
        assert!(matches!(ticket.classify(), TicketOutcome::PermanentlyInvalid { .. }));
    }

    #[test]
    fn other_errors_are_transient() {
        let ticket = DeliveryTicket::error("slow down", Some("MessageRateExceeded"));
        assert_eq!(
            ticket.classify(),
            TicketOutcome::Failed {
                message: "slow down".to_string()
            }
        );
    }

    #[test]
    fn ticket_deserializes_gateway_shape() {
        let ticket: DeliveryTicket = serde_json::from_str(
            r#"{"status":"error","message":"not registered","details":{"error":"DeviceNotRegistered"}}"#,
        )
        .unwrap();
        assert!(matches!(ticket.classify(), TicketOutcome::PermanentlyInvalid { .. }));
    }

    #[test]
    fn message_carries_notification_fields() {
        let notification = Notification::new(
            Subject::vendor(SubjectId::new("v1").unwrap()),
            "New order",
            "You have a new order",
        )
        .with_data(serde_json::json!({"orderId": "o1"}));

        let message = PushMessage::for_token("tok", &notification);
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["to"], "tok");
        assert_eq!(json["sound"], "default");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["data"]["orderId"], "o1");
    }
}
