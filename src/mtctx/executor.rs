//! The generic worker thread-pool contract and its concrete backend.

use crate::threadpool::TPool;

pub type JobFn = Box<dyn FnOnce() + Send + 'static>;

/// `create(nThreads, queueDepth, alloc)` / `add` (may block) / `tryAdd`
/// (non-blocking) / `free` (joins, via `Drop` on the concrete type).
///
/// A trait so the orchestrator core can be exercised against a mock pool
/// in tests without spinning up real OS threads.
pub trait JobExecutor: Send + Sync {
    /// May block until a slot is free.
    fn submit(&self, job: JobFn);
    /// Returns `None` on success; returns the same job back, unexecuted,
    /// instead of blocking when no slot is free.
    fn try_submit(&self, job: JobFn) -> Option<JobFn>;
    /// Blocks until every submitted job has completed.
    fn join_all(&self);
}

/// Concrete backend: the teacher's `TPool`, extended with `try_submit_job`.
pub struct MtThreadPool {
    pool: TPool,
}

impl MtThreadPool {
    pub fn new(nb_threads: usize, queue_depth: usize) -> Option<Self> {
        TPool::new(nb_threads, queue_depth).map(|pool| MtThreadPool { pool })
    }
}

impl JobExecutor for MtThreadPool {
    fn submit(&self, job: JobFn) {
        self.pool.submit_job(job);
    }

    fn try_submit(&self, job: JobFn) -> Option<JobFn> {
        self.pool.try_submit_job(job)
    }

    fn join_all(&self) {
        self.pool.jobs_completed();
    }
}
