//! In-memory storage adapters.
//!
//! Back the service when no database is configured and serve as fixtures in
//! tests. Everything lives behind `tokio::sync::RwLock`.

mod notifications;
mod order_repository;
mod payees;
mod promo_codes;
mod push_tokens;

pub use notifications::{InMemoryNotificationHistory, InMemoryPreferenceRepository};
pub use order_repository::InMemoryOrderRepository;
pub use payees::InMemoryPayeeDirectory;
pub use promo_codes::InMemoryPromoCodeRepository;
pub use push_tokens::InMemoryPushTokenRepository;
