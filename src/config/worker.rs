//! Side-effect worker pool configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Sizing for the background queue that runs payouts and notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Bounded channel capacity; tasks beyond it are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Number of concurrent workers draining the queue
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 || self.worker_count == 0 {
            return Err(ValidationError::InvalidWorkerPool);
        }
        Ok(())
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            worker_count: default_worker_count(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_worker_count() -> usize {
    4
}
