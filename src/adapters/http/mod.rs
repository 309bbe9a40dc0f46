//! HTTP adapter - REST surface over the application handlers.
//!
//! One public endpoint for the payment provider plus internal endpoints for
//! trusted collaborators (order status, payout reconciliation, device tokens,
//! preferences and history).

mod dto;
mod errors;
mod handlers;
mod routes;
mod state;

pub use errors::{ApiError, WebhookRejection};
pub use handlers::SIGNATURE_HEADER;
pub use routes::router;
pub use state::AppState;
