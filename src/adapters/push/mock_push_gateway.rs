//! Mock push gateway for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::notification::{DeliveryTicket, PushMessage};
use crate::ports::{GatewayError, PushGateway};

#[derive(Default)]
struct MockState {
    batches: Vec<Vec<PushMessage>>,
    scripted: VecDeque<Result<Vec<DeliveryTicket>, GatewayError>>,
}

/// Returns scripted responses in order; once the script runs out every
/// message gets an `ok` ticket.
///
/// # Panics
///
/// Helpers panic if the internal mutex is poisoned. Test use only.
#[derive(Clone, Default)]
pub struct MockPushGateway {
    inner: Arc<Mutex<MockState>>,
}

impl MockPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, tickets: Vec<DeliveryTicket>) {
        self.lock().scripted.push_back(Ok(tickets));
    }

    pub fn fail_with(&self, error: GatewayError) {
        self.lock().scripted.push_back(Err(error));
    }

    pub fn batches(&self) -> Vec<Vec<PushMessage>> {
        self.lock().batches.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().batches.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().expect("MockPushGateway: lock poisoned")
    }
}

#[async_trait]
impl PushGateway for MockPushGateway {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<DeliveryTicket>, GatewayError> {
        let mut state = self.lock();
        state.batches.push(messages.to_vec());
        match state.scripted.pop_front() {
            Some(response) => response,
            None => Ok(messages.iter().map(|_| DeliveryTicket::ok()).collect()),
        }
    }
}
