use std::future::Future;
use std::pin::Pin;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::oneshot;

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("task queue is closed")]
    Closed,

    #[error("queued task aborted before completing")]
    Aborted,
}

/// Runs submitted tasks strictly one at a time, in submission order
///
/// A task is placed in the queue the moment [`TaskQueue::enqueue`] is called, not when the
/// returned future is first polled. A task that panics is reported as [`QueueError::Aborted`]
/// to its own caller and the queue moves on to the next one.
#[derive(Clone)]
pub struct TaskQueue {
    tx: AsyncSender<Job>,
}

impl TaskQueue {
    /// Spawns the worker on the current tokio runtime
    pub fn new() -> Self {
        let (tx, rx) = kanal::unbounded_async();
        tokio::spawn(drain(rx));
        Self { tx }
    }

    pub fn enqueue<F, T>(&self, task: F) -> impl Future<Output = Result<T, QueueError>> + Send + 'static
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            // Receiver may be gone if the caller stopped waiting
            let _ = done_tx.send(task.await);
        });

        let submitted = matches!(self.tx.try_send(job), Ok(true));

        async move {
            if !submitted {
                return Err(QueueError::Closed);
            }
            done_rx.await.map_err(|_| QueueError::Aborted)
        }
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

async fn drain(rx: AsyncReceiver<Job>) {
    while let Ok(job) = rx.recv().await {
        // Each job runs in its own task so a panic stays contained
        if let Err(e) = tokio::spawn(job).await {
            tracing::error!("Queued store task failed: {}", e);
        }
    }
    tracing::debug!("Task queue closed");
}
