//! Push notification gateway adapters.

mod expo_gateway;
mod mock_push_gateway;

pub use expo_gateway::{ExpoPushConfig, ExpoPushGateway};
pub use mock_push_gateway::MockPushGateway;
