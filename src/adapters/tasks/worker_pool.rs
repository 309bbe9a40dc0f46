//! Bounded in-process side-effect queue and the workers that drain it.
//!
//! `enqueue` never waits: a full channel drops the task with a warning.
//! Delivery is at-most-once and unordered across workers.
//!
//! ## Graceful Shutdown
//!
//! On the shutdown signal the channel is closed and each worker runs what
//! was already received before exiting.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::config::WorkerConfig;
use crate::ports::{EnqueueError, SideEffectQueue, SideEffectTask};

use super::SideEffectExecutor;

/// Producer half, shared with request handlers.
#[derive(Clone)]
pub struct MpscSideEffectQueue {
    sender: mpsc::Sender<SideEffectTask>,
}

impl SideEffectQueue for MpscSideEffectQueue {
    fn enqueue(&self, task: SideEffectTask) -> Result<(), EnqueueError> {
        self.sender.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(task) => {
                tracing::warn!(task = task.kind(), "Side-effect queue full, dropping task");
                EnqueueError::Full
            }
            mpsc::error::TrySendError::Closed(task) => {
                tracing::warn!(task = task.kind(), "Side-effect queue closed, dropping task");
                EnqueueError::Closed
            }
        })
    }
}

/// Consumer half; owns the receiver until spawned.
pub struct SideEffectWorkerPool {
    receiver: mpsc::Receiver<SideEffectTask>,
    worker_count: usize,
}

impl SideEffectWorkerPool {
    /// Creates the channel pair sized from configuration.
    pub fn new(config: &WorkerConfig) -> (MpscSideEffectQueue, Self) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        (
            MpscSideEffectQueue { sender },
            Self {
                receiver,
                worker_count: config.worker_count.max(1),
            },
        )
    }

    /// Spawns the workers. Each exits once shutdown is signalled and its
    /// share of the received tasks is done, or when every sender is gone.
    pub fn spawn(
        self,
        executor: Arc<SideEffectExecutor>,
        shutdown: watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        let receiver = Arc::new(Mutex::new(self.receiver));
        tracing::info!(workers = self.worker_count, "Starting side-effect workers");

        (0..self.worker_count)
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let executor = Arc::clone(&executor);
                let shutdown = shutdown.clone();
                tokio::spawn(run_worker(worker, receiver, executor, shutdown))
            })
            .collect()
    }
}

async fn run_worker(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<SideEffectTask>>>,
    executor: Arc<SideEffectExecutor>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    drain(worker, &receiver, &executor).await;
                    return;
                }
            }

            task = next_task(&receiver) => {
                match task {
                    Some(task) => executor.execute(task).await,
                    None => {
                        tracing::debug!(worker, "Side-effect queue closed");
                        return;
                    }
                }
            }
        }
    }
}

async fn next_task(receiver: &Mutex<mpsc::Receiver<SideEffectTask>>) -> Option<SideEffectTask> {
    receiver.lock().await.recv().await
}

async fn drain(
    worker: usize,
    receiver: &Mutex<mpsc::Receiver<SideEffectTask>>,
    executor: &SideEffectExecutor,
) {
    let mut drained = 0;
    loop {
        let task = {
            let mut rx = receiver.lock().await;
            rx.close();
            rx.try_recv().ok()
        };
        match task {
            Some(task) => {
                executor.execute(task).await;
                drained += 1;
            }
            None => break,
        }
    }
    tracing::debug!(worker, drained, "Side-effect worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryNotificationHistory, InMemoryOrderRepository, InMemoryPayeeDirectory,
        InMemoryPreferenceRepository, InMemoryPushTokenRepository,
    };
    use crate::adapters::push::MockPushGateway;
    use crate::adapters::stripe::MockTransferGateway;
    use crate::application::handlers::notification::DispatchNotificationHandler;
    use crate::application::handlers::payout::{PayoutSettings, TransferPayoutHandler};
    use crate::domain::foundation::{OrderId, Subject, SubjectId};
    use crate::domain::notification::{Notification, Platform, PushToken};
    use crate::ports::PushTokenRepository;

    fn config(queue_capacity: usize, worker_count: usize) -> WorkerConfig {
        WorkerConfig {
            queue_capacity,
            worker_count,
        }
    }

    fn buyer() -> Subject {
        Subject::buyer(SubjectId::new("buyer-1").unwrap())
    }

    async fn executor(push: &MockPushGateway) -> Arc<SideEffectExecutor> {
        let tokens = InMemoryPushTokenRepository::new();
        tokens
            .upsert(&PushToken::register("tok-1", buyer(), Platform::Android).unwrap())
            .await
            .unwrap();
        let notifications = DispatchNotificationHandler::new(
            Arc::new(tokens),
            Arc::new(InMemoryPreferenceRepository::new()),
            Arc::new(InMemoryNotificationHistory::new()),
            Arc::new(push.clone()),
        );
        let payouts = TransferPayoutHandler::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(InMemoryPayeeDirectory::new()),
            Arc::new(MockTransferGateway::new()),
            PayoutSettings::default(),
        );
        Arc::new(SideEffectExecutor::new(Arc::new(payouts), Arc::new(notifications)))
    }

    fn note(title: &str) -> SideEffectTask {
        SideEffectTask::Notify(Notification::new(buyer(), title, "body"))
    }

    #[test]
    fn full_queue_rejects_without_blocking() {
        let (queue, _pool) = SideEffectWorkerPool::new(&config(1, 1));

        assert!(queue.enqueue(note("first")).is_ok());
        assert_eq!(queue.enqueue(note("second")), Err(EnqueueError::Full));
    }

    #[test]
    fn dropped_pool_closes_queue() {
        let (queue, pool) = SideEffectWorkerPool::new(&config(4, 1));
        drop(pool);

        assert_eq!(queue.enqueue(note("late")), Err(EnqueueError::Closed));
    }

    #[tokio::test]
    async fn workers_run_queued_tasks() {
        let push = MockPushGateway::new();
        let (queue, pool) = SideEffectWorkerPool::new(&config(16, 2));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handles = pool.spawn(executor(&push).await, shutdown_rx);

        for i in 0..5 {
            queue.enqueue(note(&format!("note {}", i))).unwrap();
        }
        drop(queue);

        for handle in handles {
            handle.await.unwrap();
        }
        drop(shutdown_tx);
        assert_eq!(push.call_count(), 5);
    }

    #[tokio::test]
    async fn shutdown_drains_received_tasks() {
        let push = MockPushGateway::new();
        let (queue, pool) = SideEffectWorkerPool::new(&config(16, 1));
        for i in 0..3 {
            queue.enqueue(note(&format!("note {}", i))).unwrap();
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();

        let handles = pool.spawn(executor(&push).await, shutdown_rx);
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(push.call_count(), 3);
        assert_eq!(queue.enqueue(note("late")), Err(EnqueueError::Closed));
    }

    #[tokio::test]
    async fn failing_payout_does_not_stop_worker() {
        let push = MockPushGateway::new();
        let (queue, pool) = SideEffectWorkerPool::new(&config(16, 1));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let handles = pool.spawn(executor(&push).await, shutdown_rx);

        queue
            .enqueue(SideEffectTask::Payout {
                order_id: OrderId::new(),
                payee_id: SubjectId::new("vendor-1").unwrap(),
                settled_amount: 100,
            })
            .unwrap();
        queue.enqueue(note("after payout")).unwrap();
        drop(queue);

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(push.call_count(), 1);
    }
}
