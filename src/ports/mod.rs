//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `OrderRepository` - Idempotent order persistence keyed by session id
//! - `PromoCodeRepository` - Promo lookup and atomic usage counter
//! - `PayeeDirectory` - Read-only payee payout settings
//! - `PushTokenRepository` - Device token registry
//! - `PreferenceRepository` / `NotificationHistoryRepository`
//!
//! ## Gateway Ports
//!
//! - `TransferGateway` - Payee transfers at the payment provider
//! - `PushGateway` - Batched push delivery
//!
//! ## Work Dispatch
//!
//! - `SideEffectQueue` - Fire-and-forget payout and notification tasks

mod gateway_error;
mod notification_store;
mod order_repository;
mod payee_directory;
mod promo_code_repository;
mod push_gateway;
mod push_token_repository;
mod side_effect_queue;
mod transfer_gateway;

pub use gateway_error::{GatewayError, GatewayErrorCode};
pub use notification_store::{NotificationHistoryRepository, PreferenceRepository};
pub use order_repository::{InsertResult, OrderRepository};
pub use payee_directory::PayeeDirectory;
pub use promo_code_repository::PromoCodeRepository;
pub use push_gateway::PushGateway;
pub use push_token_repository::PushTokenRepository;
pub use side_effect_queue::{EnqueueError, SideEffectQueue, SideEffectTask};
pub use transfer_gateway::{TransferGateway, TransferReceipt, TransferRequest};
