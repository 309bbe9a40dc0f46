//! Side-effect task execution: the in-process queue, its workers and a
//! recording queue for tests.

mod executor;
mod recording_queue;
mod worker_pool;

pub use executor::SideEffectExecutor;
pub use recording_queue::RecordingSideEffectQueue;
pub use worker_pool::{MpscSideEffectQueue, SideEffectWorkerPool};
