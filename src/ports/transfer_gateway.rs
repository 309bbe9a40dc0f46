//! Transfer gateway port.
//!
//! Moves funds from the platform balance to a payee's connected account.
//! Implementations must forward the idempotency key so that a repeated
//! request for the same order never produces a second transfer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, SubjectId};

use super::GatewayError;

#[async_trait]
pub trait TransferGateway: Send + Sync {
    async fn create_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, GatewayError>;
}

/// A request to pay a payee their share of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Amount in minor units
    pub amount: i64,
    pub currency: String,
    /// Connected account id at the provider
    pub destination: String,
    pub order_id: OrderId,
    pub payee_id: SubjectId,
    pub platform_fee: i64,
    pub idempotency_key: String,
}

impl TransferRequest {
    /// Key used for every transfer attempt of an order.
    pub fn idempotency_key_for(order_id: &OrderId) -> String {
        format!("payout-{}", order_id)
    }
}

/// A transfer the provider accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn TransferGateway) {}
    }

    #[test]
    fn idempotency_key_is_stable_per_order() {
        let id = OrderId::new();
        assert_eq!(
            TransferRequest::idempotency_key_for(&id),
            TransferRequest::idempotency_key_for(&id)
        );
        assert!(TransferRequest::idempotency_key_for(&id).starts_with("payout-"));
    }
}
