//! Task Queue
//!
//! Background worker that runs cache operations in submission order.
//!
//! The host store is synchronous, but callers get deferred completion: an
//! operation is queued when it is submitted and its completion runs later, on
//! the worker, never inside the submitting call. Jobs run strictly FIFO; one
//! job finishes (store lock released, completion invoked) before the next
//! starts.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::error::{CacheError, Result};
use crate::store::Backend;

/// Continuation run after a job, outside the store lock.
pub type Completion = Box<dyn FnOnce() + Send>;

/// A queued operation. It receives `None` when the worker is gone.
pub type Job<B> = Box<dyn FnOnce(Option<&mut CacheStore<B>>) -> Completion + Send>;

// == Task Queue ==
/// Submission handle for the queue worker.
pub struct TaskQueue<B> {
    tx: mpsc::UnboundedSender<Job<B>>,
}

impl<B> Clone for TaskQueue<B> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<B: Backend + 'static> TaskQueue<B> {
    /// Queues a job behind every job submitted before it.
    ///
    /// If the worker has stopped, the job is completed with no store on a
    /// fresh task so its continuation still runs.
    pub fn submit(&self, job: Job<B>) {
        if let Err(mpsc::error::SendError(job)) = self.tx.send(job) {
            warn!("Task queue worker is gone, failing queued operation");
            let done = job(None);
            tokio::spawn(async move { done() });
        }
    }

    /// Queues `op` and hands its result to `on_done` once it has run.
    pub fn run<R, F, C>(&self, op: F, on_done: C)
    where
        R: Send + 'static,
        F: FnOnce(&mut CacheStore<B>) -> Result<R> + Send + 'static,
        C: FnOnce(Result<R>) + Send + 'static,
    {
        self.submit(Box::new(move |store: Option<&mut CacheStore<B>>| {
            let result = match store {
                Some(store) => op(store),
                None => Err(queue_closed()),
            };
            Box::new(move || on_done(result)) as Completion
        }));
    }
}

/// Error reported when no worker is left to run an operation.
pub fn queue_closed() -> CacheError {
    CacheError::Internal("task queue closed".to_string())
}

/// Spawns the worker that drains the queue against `engine`.
///
/// The worker stops once every [`TaskQueue`] handle has been dropped.
///
/// # Panics
/// Must be called from within a tokio runtime.
pub fn spawn_queue_worker<B: Backend + 'static>(engine: Arc<Mutex<CacheStore<B>>>) -> TaskQueue<B> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Job<B>>();

    tokio::spawn(async move {
        debug!("Task queue worker started");

        while let Some(job) = rx.recv().await {
            let done = {
                let mut store = engine.lock();
                job(Some(&mut *store))
            };
            done();
        }

        debug!("Task queue worker stopped");
    });

    TaskQueue { tx }
}
