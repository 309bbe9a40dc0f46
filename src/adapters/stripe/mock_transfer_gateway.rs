//! Mock transfer gateway for testing.
//!
//! Records every request, returns sequential transfer ids and can be told
//! to fail.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::ports::{GatewayError, TransferGateway, TransferReceipt, TransferRequest};

#[derive(Default)]
struct MockState {
    requests: Vec<TransferRequest>,
    next_error: Option<GatewayError>,
    fail_always: Option<GatewayError>,
}

/// # Panics
///
/// Helpers panic if the internal mutex is poisoned. Test use only.
#[derive(Clone, Default)]
pub struct MockTransferGateway {
    inner: Arc<Mutex<MockState>>,
}

impl MockTransferGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that rejects every transfer.
    pub fn failing(error: GatewayError) -> Self {
        let mock = Self::new();
        mock.lock().fail_always = Some(error);
        mock
    }

    /// Fails only the next call.
    pub fn fail_next(&self, error: GatewayError) {
        self.lock().next_error = Some(error);
    }

    pub fn requests(&self) -> Vec<TransferRequest> {
        self.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().expect("MockTransferGateway: lock poisoned")
    }
}

#[async_trait]
impl TransferGateway for MockTransferGateway {
    async fn create_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, GatewayError> {
        let mut state = self.lock();
        state.requests.push(request);
        if let Some(err) = state.next_error.take() {
            return Err(err);
        }
        if let Some(err) = &state.fail_always {
            return Err(err.clone());
        }
        Ok(TransferReceipt {
            transfer_id: format!("tr_mock_{}", state.requests.len()),
        })
    }
}
