//! Side-effect queue port.
//!
//! Payout and notification work runs after the webhook has been answered.
//! Enqueueing never blocks the caller; delivery is at most once and
//! unordered.

use crate::domain::foundation::{OrderId, SubjectId};
use crate::domain::notification::Notification;

/// Work to run outside the request path.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffectTask {
    Payout {
        order_id: OrderId,
        payee_id: SubjectId,
        settled_amount: i64,
    },
    Notify(Notification),
}

impl SideEffectTask {
    pub fn kind(&self) -> &'static str {
        match self {
            SideEffectTask::Payout { .. } => "payout",
            SideEffectTask::Notify(_) => "notify",
        }
    }
}

/// Why a task was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    Full,
    Closed,
}

impl std::fmt::Display for EnqueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnqueueError::Full => write!(f, "side-effect queue is full"),
            EnqueueError::Closed => write!(f, "side-effect queue is closed"),
        }
    }
}

impl std::error::Error for EnqueueError {}

pub trait SideEffectQueue: Send + Sync {
    /// Hands a task to the workers without waiting.
    fn enqueue(&self, task: SideEffectTask) -> Result<(), EnqueueError>;
}
