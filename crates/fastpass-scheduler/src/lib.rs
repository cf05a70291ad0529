//! Off-thread task submission for FastPass.
//!
//! Verifying a login can block: the standard path may call out to the
//! session servers and an auth plugin may hit its database. None of that is
//! allowed on the thread that handles a connection event, so the listeners
//! hand such work to an [`AsyncScheduler`].
//!
//! The scheduler doesn't own any threads itself. It wraps an [`Executor`]
//! supplied by the host (or [`TokioExecutor`], which uses Tokio's blocking
//! pool) and adds the bookkeeping FastPass needs on top: error handling,
//! an in-flight counter and a way to wait for all work to drain.
//!
//! # Integration
//!
//! ```ignore
//! let scheduler = AsyncScheduler::new(Arc::new(TokioExecutor::new(handle)));
//! scheduler.run_async(move || {
//!     let premium = verifier.verify(&name)?;
//!     session.resolve(premium, uuid)?;
//!     Ok::<_, FastPassError>(())
//! });
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, error, trace};

// ---------------------------------------------------------------------------
// Executors
// ---------------------------------------------------------------------------

/// A unit of work handed to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs somewhere other than the caller's thread.
///
/// This is the host's "run this asynchronously" primitive. Implementations
/// must not run the job on the calling thread unless, like
/// [`InlineExecutor`], that is their documented purpose.
pub trait Executor: Send + Sync + 'static {
    fn execute(&self, job: Job);
}

/// [`Executor`] backed by Tokio's blocking thread pool.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on, if any.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, job: Job) {
        // Panics surface through the dropped JoinHandle; the scheduler's
        // guard still settles the in-flight count.
        drop(self.handle.spawn_blocking(job));
    }
}

/// Runs every job immediately on the calling thread.
///
/// For tests and single-threaded embedders where ordering must be exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Stats {
    active: AtomicUsize,
    submitted: AtomicU64,
    failed: AtomicU64,
    idle: Notify,
}

/// Decrements the in-flight count even if the task panics.
struct ActiveGuard(Arc<Stats>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if self.0.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Submits fallible tasks to an [`Executor`] and keeps count of them.
///
/// Cheap to clone; clones share the executor and the counters.
#[derive(Clone)]
pub struct AsyncScheduler {
    executor: Arc<dyn Executor>,
    stats: Arc<Stats>,
}

impl AsyncScheduler {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            stats: Arc::new(Stats::default()),
        }
    }

    /// Runs `task` off-thread. Errors are logged.
    pub fn run_async<F, E>(&self, task: F)
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        self.run_async_with(task, |e| {
            error!(error = %e, "async task failed");
        });
    }

    /// Runs `task` off-thread and hands any error to `on_error`.
    ///
    /// `on_error` runs on the same thread as the task, right after it.
    pub fn run_async_with<F, E, H>(&self, task: F, on_error: H)
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Send + 'static,
        H: FnOnce(E) + Send + 'static,
    {
        let task_id = self.stats.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        self.stats.active.fetch_add(1, Ordering::AcqRel);
        let guard = ActiveGuard(Arc::clone(&self.stats));

        self.executor.execute(Box::new(move || {
            trace!(task_id, "async task started");
            if let Err(e) = task() {
                guard.0.failed.fetch_add(1, Ordering::Relaxed);
                on_error(e);
            }
            trace!(task_id, "async task finished");
            drop(guard);
        }));
    }

    /// Tasks submitted but not yet finished.
    pub fn active_tasks(&self) -> usize {
        self.stats.active.load(Ordering::Acquire)
    }

    /// Total tasks ever submitted.
    pub fn submitted_tasks(&self) -> u64 {
        self.stats.submitted.load(Ordering::Relaxed)
    }

    /// Total tasks that returned an error.
    pub fn failed_tasks(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }

    /// Waits until no task is in flight, or `timeout` elapses.
    ///
    /// Returns `true` if the scheduler drained in time.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let drained = async {
            loop {
                let notified = self.stats.idle.notified();
                if self.active_tasks() == 0 {
                    return;
                }
                notified.await;
            }
        };

        match tokio::time::timeout(timeout, drained).await {
            Ok(()) => true,
            Err(_) => {
                debug!(
                    active = self.active_tasks(),
                    "scheduler still busy after timeout"
                );
                false
            }
        }
    }
}

impl fmt::Debug for AsyncScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncScheduler")
            .field("active", &self.active_tasks())
            .field("submitted", &self.submitted_tasks())
            .field("failed", &self.failed_tasks())
            .finish()
    }
}
