//! Notification domain module.
//!
//! Device tokens, category preferences, push messages and the history kept
//! for delivered notifications.

mod delivery;
mod errors;
mod history;
mod preferences;
mod push_token;

pub use delivery::{
    DeliveryTicket, DispatchOutcome, Notification, PushMessage, PushPriority, TicketDetails,
    TicketOutcome,
};
pub use errors::NotificationError;
pub use history::NotificationRecord;
pub use preferences::{NotificationCategory, NotificationPreferences};
pub use push_token::{Platform, PushToken};
