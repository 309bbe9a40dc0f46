//! Recording side-effect queue for testing.

use std::sync::{Arc, Mutex};

use crate::ports::{EnqueueError, SideEffectQueue, SideEffectTask};

#[derive(Default)]
struct RecordingState {
    tasks: Vec<SideEffectTask>,
    reject: Option<EnqueueError>,
}

/// Keeps every accepted task in memory instead of running it.
///
/// # Panics
///
/// Helpers panic if the internal mutex is poisoned. Test use only.
#[derive(Clone, Default)]
pub struct RecordingSideEffectQueue {
    inner: Arc<Mutex<RecordingState>>,
}

impl RecordingSideEffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `enqueue` fail with `error`.
    pub fn reject_with(&self, error: EnqueueError) {
        self.lock().reject = Some(error);
    }

    pub fn tasks(&self) -> Vec<SideEffectTask> {
        self.lock().tasks.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingState> {
        self.inner
            .lock()
            .expect("RecordingSideEffectQueue: lock poisoned")
    }
}

impl SideEffectQueue for RecordingSideEffectQueue {
    fn enqueue(&self, task: SideEffectTask) -> Result<(), EnqueueError> {
        let mut state = self.lock();
        if let Some(error) = state.reject {
            return Err(error);
        }
        state.tasks.push(task);
        Ok(())
    }
}
