//! Shared per-job completion state for the streaming path.
//!
//! Only the fields the worker mutates after dispatch live here, behind the
//! orchestrator's single completion mutex/condvar. Everything the worker
//! needs to *read* while compressing (source bytes, prefix, parameters) is
//! handed to it by value as a [`JobInput`] when the job is spawned, so the
//! completion lock is never held for the duration of a compression — only
//! for the brief per-field updates §5 describes.

use crate::frame::cdict::Lz4FCDict;
use crate::mtctx::buffer_pool::PooledBuffer;
use crate::mtctx::error::MtError;
use crate::mtctx::params::SectionParams;

/// Wraps a raw `*const Lz4FCDict` to opt into `Send`.
///
/// Grounded on the identical `SyncCDictPtr` newtype in
/// `io::compress_mt`: `Lz4FCDict` is `Sync` and outlives the session, only
/// the raw pointer itself needs the opt-in.
#[derive(Clone, Copy)]
pub struct SyncCDictPtr(pub *const Lz4FCDict);
// SAFETY: Lz4FCDict is Sync; the pointer is read-only for the job's duration.
unsafe impl Send for SyncCDictPtr {}
unsafe impl Sync for SyncCDictPtr {}

/// Everything a worker needs to compress one section, owned by the closure
/// spawned onto the thread pool.
pub struct JobInput {
    /// Prefix bytes (overlap) followed by the payload bytes.
    pub src: PooledBuffer,
    pub prefix_size: usize,
    pub src_size: usize,
    /// Pledged total uncompressed frame size; only meaningful on `first_chunk`.
    pub full_frame_size: u64,
    pub first_chunk: bool,
    pub last_chunk: bool,
    pub params: SectionParams,
    /// Present only on `first_chunk`, when a pre-digested dictionary was supplied.
    pub cdict: Option<SyncCDictPtr>,
}

/// Fields mutated by the worker under the completion mutex, read by the
/// orchestrator only after observing `job_completed`.
pub struct JobState {
    pub dst_buf: Option<PooledBuffer>,
    pub c_size: Result<usize, MtError>,
    pub dst_flushed: usize,
    pub consumed: u64,
    pub job_completed: bool,
    pub frame_checksum_needed: bool,
}

impl JobState {
    pub fn empty() -> Self {
        JobState {
            dst_buf: None,
            c_size: Ok(0),
            dst_flushed: 0,
            consumed: 0,
            job_completed: false,
            frame_checksum_needed: false,
        }
    }

    /// Resets a slot for reuse by a later `job_id` in the ring.
    pub fn reset(&mut self) {
        *self = JobState::empty();
    }
}

/// Ring of job slots, `2^k` entries, `k` chosen so the table holds at least
/// `min_entries`, plus the orchestrator's own ring/frame bookkeeping.
///
/// These orchestrator fields (`next_job_id`, `done_job_id`, `frame_ended`,
/// `all_jobs_completed`) live in the same struct as the job slots — and
/// therefore behind the same single completion `Mutex` — rather than a
/// second lock, to honor the "exactly three mutexes per session" invariant:
/// BufferPool's, CCtxPool's, and this one. A rejected-but-retriable
/// submission is tracked separately, by the single orchestrator thread that
/// owns dispatch (see `StreamCtx::pending_job`), not here.
pub struct JobTable {
    slots: Vec<JobState>,
    mask: usize,
    pub next_job_id: u64,
    pub done_job_id: u64,
    pub frame_ended: bool,
    pub all_jobs_completed: bool,
}

impl JobTable {
    pub fn with_capacity_for(min_entries: usize) -> Self {
        let k = min_entries.max(1).next_power_of_two();
        let slots = (0..k).map(|_| JobState::empty()).collect();
        JobTable {
            slots,
            mask: k - 1,
            next_job_id: 0,
            done_job_id: 0,
            frame_ended: false,
            all_jobs_completed: true,
        }
    }

    pub fn mask(&self) -> usize {
        self.mask
    }

    pub fn slot(&self, job_id: u64) -> &JobState {
        &self.slots[(job_id as usize) & self.mask]
    }

    pub fn slot_mut(&mut self, job_id: u64) -> &mut JobState {
        &mut self.slots[(job_id as usize) & self.mask]
    }

    /// Resets ring bookkeeping for a fresh compression; keeps the slots'
    /// allocations (they are reset lazily as each `job_id` wraps around).
    pub fn reset_for_new_session(&mut self) {
        self.next_job_id = 0;
        self.done_job_id = 0;
        self.frame_ended = false;
        self.all_jobs_completed = true;
    }

    /// Grows (and resets) the table if it cannot hold `min_entries`. Only
    /// valid to call when no jobs are in flight (between compressions).
    pub fn grow_to(&mut self, min_entries: usize) {
        if self.slots.len() < min_entries.max(1).next_power_of_two() {
            let mut fresh = JobTable::with_capacity_for(min_entries);
            fresh.next_job_id = self.next_job_id;
            fresh.done_job_id = self.done_job_id;
            fresh.frame_ended = self.frame_ended;
            fresh.all_jobs_completed = self.all_jobs_completed;
            *self = fresh;
        }
    }
}
