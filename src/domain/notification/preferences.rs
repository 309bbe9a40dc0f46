//! Notification categories and per-subject opt-outs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Topic a notification belongs to. Subjects can silence each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Orders,
    Messages,
    Reminders,
    Promotions,
    Consultations,
}

impl NotificationCategory {
    pub const ALL: [NotificationCategory; 5] = [
        NotificationCategory::Orders,
        NotificationCategory::Messages,
        NotificationCategory::Reminders,
        NotificationCategory::Promotions,
        NotificationCategory::Consultations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Orders => "orders",
            NotificationCategory::Messages => "messages",
            NotificationCategory::Reminders => "reminders",
            NotificationCategory::Promotions => "promotions",
            NotificationCategory::Consultations => "consultations",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "category",
                    format!("unknown notification category '{}'", s),
                )
            })
    }
}

/// Category switches for one subject. A subject with no stored row gets
/// `Default`, which enables everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub orders: bool,
    pub messages: bool,
    pub reminders: bool,
    pub promotions: bool,
    pub consultations: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            orders: true,
            messages: true,
            reminders: true,
            promotions: true,
            consultations: true,
        }
    }
}

impl NotificationPreferences {
    pub fn allows(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::Orders => self.orders,
            NotificationCategory::Messages => self.messages,
            NotificationCategory::Reminders => self.reminders,
            NotificationCategory::Promotions => self.promotions,
            NotificationCategory::Consultations => self.consultations,
        }
    }

    pub fn set(&mut self, category: NotificationCategory, enabled: bool) {
        let slot = match category {
            NotificationCategory::Orders => &mut self.orders,
            NotificationCategory::Messages => &mut self.messages,
            NotificationCategory::Reminders => &mut self.reminders,
            NotificationCategory::Promotions => &mut self.promotions,
            NotificationCategory::Consultations => &mut self.consultations,
        };
        *slot = enabled;
    }
}
