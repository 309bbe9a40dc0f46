//! Push gateway port.

use async_trait::async_trait;

use crate::domain::notification::{DeliveryTicket, PushMessage};

use super::GatewayError;

/// Sends a batch of push messages in one request.
///
/// On success the tickets are positionally aligned with `messages`. A
/// gateway may return fewer tickets than messages; callers must not assume
/// equal length.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<DeliveryTicket>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PushGateway) {}
    }
}
