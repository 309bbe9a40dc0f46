//! Notification handlers: dispatch, device tokens, preferences and history.

mod dispatch_notification;
mod history;
mod preferences;
mod push_tokens;

pub use dispatch_notification::DispatchNotificationHandler;
pub use history::{ListNotificationsHandler, MarkNotificationReadHandler};
pub use preferences::{GetPreferencesHandler, UpdatePreferencesHandler};
pub use push_tokens::{DisablePushTokenHandler, RegisterPushTokenCommand, RegisterPushTokenHandler};
