//! Single-consumer FIFO job queue.
//!
//! Any number of `JobQueue` handles may enqueue; exactly one `JobWorker`
//! drains. The worker awaits each job before taking the next, so handlers
//! never run concurrently and downstream load is bounded to one call.
//!
//! A failing or panicking job is logged and dropped. The queue never retries
//! on its own; retries come from the orchestrator's sweep.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sync_telemetry::{log_job_event, metric_inc, metric_set, JOBS_PROCESSED, QUEUE_DEPTH};
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Job, JobKind, SyncError};

/// Consumer side of the queue.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Run one job to completion.
    async fn handle(&self, job: Job) -> Result<(), SyncError>;
}

#[derive(Debug, Default)]
struct QueueTracker {
    /// Enqueued, not yet started.
    waiting: AtomicUsize,
    /// Enqueued, not yet finished.
    outstanding: AtomicUsize,
    idle: Notify,
}

impl QueueTracker {
    fn enqueued(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let waiting = self.waiting.fetch_add(1, Ordering::SeqCst) + 1;
        metric_set!(QUEUE_DEPTH, waiting);
    }

    fn rejected(&self) {
        self.waiting.fetch_sub(1, Ordering::SeqCst);
        self.finished();
    }

    fn started(&self) {
        let waiting = self.waiting.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        metric_set!(QUEUE_DEPTH, waiting);
    }

    fn finished(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Producer handle. Cheap to clone.
#[derive(Clone, Debug)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<Job>,
    tracker: Arc<QueueTracker>,
}

impl JobQueue {
    /// Create a queue and its single worker.
    pub fn new() -> (Self, JobWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = Arc::new(QueueTracker::default());
        (
            Self {
                tx,
                tracker: Arc::clone(&tracker),
            },
            JobWorker { rx, tracker },
        )
    }

    /// Append a job. Returns immediately.
    ///
    /// # Errors
    /// `QueueClosed` once the worker has gone away.
    pub fn enqueue(&self, kind: JobKind) -> Result<Uuid, SyncError> {
        let job = Job::new(kind);
        let id = job.id;
        let name = job.kind.name();

        self.tracker.enqueued();
        if self.tx.send(job).is_err() {
            self.tracker.rejected();
            return Err(SyncError::QueueClosed);
        }
        log_job_event!(debug, "Job added", id, name);
        Ok(id)
    }

    /// Jobs enqueued but not yet started.
    pub fn len(&self) -> usize {
        self.tracker.waiting.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves once every enqueued job, including jobs enqueued by running
    /// jobs, has finished.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.tracker.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.tracker.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// The one consumer of a `JobQueue`.
#[derive(Debug)]
pub struct JobWorker {
    rx: mpsc::UnboundedReceiver<Job>,
    tracker: Arc<QueueTracker>,
}

impl JobWorker {
    /// Run on a background task until `shutdown` flips to true.
    pub fn spawn(
        self,
        handler: Arc<dyn JobHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(handler, shutdown))
    }

    /// Drain jobs one at a time.
    ///
    /// Each job runs on its own task so that a panic surfaces as a join error
    /// instead of killing the loop.
    pub async fn run(mut self, handler: Arc<dyn JobHandler>, mut shutdown: watch::Receiver<bool>) {
        info!("[queue] Worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let job = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                job = self.rx.recv() => job,
            };
            let Some(job) = job else {
                break;
            };

            self.tracker.started();
            let id = job.id;
            let kind = job.kind.name();
            log_job_event!(debug, "Processing job", id, kind);

            let task_handler = Arc::clone(&handler);
            let result = tokio::spawn(async move { task_handler.handle(job).await }).await;

            match result {
                Ok(Ok(())) => {
                    metric_inc!(JOBS_PROCESSED, &[kind, "ok"]);
                }
                Ok(Err(e)) => {
                    metric_inc!(JOBS_PROCESSED, &[kind, "error"]);
                    log_job_event!(error, "Job failed, dropping", id, kind, error = %e);
                }
                Err(e) => {
                    metric_inc!(JOBS_PROCESSED, &[kind, "panic"]);
                    let err = SyncError::JobPanicked {
                        job_id: id.to_string(),
                        message: e.to_string(),
                    };
                    log_job_event!(error, "Job panicked, dropping", id, kind, error = %err);
                }
            }

            self.tracker.finished();
        }

        let abandoned = self.discard_pending();
        if abandoned > 0 {
            warn!("[queue] Worker stopped with {} jobs still queued", abandoned);
        } else {
            info!("[queue] Worker stopped");
        }
    }

    /// Close the channel and drop whatever is still buffered, settling the
    /// counters so `len` reads zero and `wait_idle` waiters wake.
    pub fn discard_pending(&mut self) -> usize {
        self.rx.close();
        let mut abandoned = 0;
        while let Ok(job) = self.rx.try_recv() {
            self.tracker.started();
            self.tracker.finished();
            let id = job.id;
            let kind = job.kind.name();
            log_job_event!(debug, "Job abandoned", id, kind);
            abandoned += 1;
        }
        abandoned
    }
}
