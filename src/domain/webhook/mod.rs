//! Webhook ingress domain.
//!
//! Signature verification and the typed event envelope for the payment
//! provider's `checkout.session.completed` notifications.

mod envelope;
mod errors;
mod signature;

pub use envelope::{
    parse_event, CheckoutMetadata, CheckoutSession, CompletedCheckout, ParsedEvent,
    WebhookEnvelope, CHECKOUT_SESSION_COMPLETED,
};
pub use errors::{SignatureFailure, WebhookError};
pub use signature::{
    signature_header_for, SignatureHeader, Verification, WebhookVerifier,
    SIGNATURE_TOLERANCE_SECS,
};
