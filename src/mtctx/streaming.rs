//! The streaming state machine: fill staging input, dispatch jobs to the
//! worker pool, flush compressed bytes back to the caller.
//!
//! Unlike the one-shot path, jobs here must survive past a single call (the
//! caller may feed bytes across many `compress_stream` invocations before
//! asking for output), so dispatch goes through the full [`JobTable`] /
//! completion `Mutex`+`Condvar` machinery described in `spec.md` §4.4.2,
//! shared with workers via `Arc`.

use std::sync::{Arc, Condvar, Mutex};

use crate::frame::cdict::Lz4FCDict;
use crate::frame::types::{ContentChecksum, Preferences};
use crate::mtctx::buffer_pool::{BufferPool, PooledBuffer};
use crate::mtctx::cctx_pool::CCtxPool;
use crate::mtctx::error::MtError;
use crate::mtctx::executor::{JobExecutor, JobFn};
use crate::mtctx::hash::RollingHash64;
use crate::mtctx::job::{JobInput, JobTable, SyncCDictPtr};
use crate::mtctx::params::{MtParams, SectionParams, JOBSIZE_MAX, JOBSIZE_MIN};
use crate::mtctx::section::SectionCompressor;
use crate::mtctx::worker::run_job;

/// `endOp` argument to `compress_stream_generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOp {
    Continue,
    Flush,
    End,
}

/// The orchestrator's pools, job table, and completion mutex/condvar,
/// shared into worker closures via `Arc`.
struct Shared<C> {
    buffer_pool: BufferPool,
    cctx_pool: CCtxPool<C>,
    table: Mutex<JobTable>,
    condvar: Condvar,
}

/// The multi-threaded streaming compression session.
///
/// Generic over the section compressor, the rolling hash, and the job
/// executor so the orchestrator core is testable against mocks of all
/// three, per the "interface-like capability objects" design note.
pub struct StreamCtx<C: SectionCompressor + 'static, H: RollingHash64, E: JobExecutor + 'static> {
    shared: Arc<Shared<C>>,
    executor: Arc<E>,
    hash: H,

    params: MtParams,
    frame_prefs: Preferences,
    owned_cdict: Option<Box<Lz4FCDict>>,

    in_buff: Option<PooledBuffer>,
    in_filled: usize,
    prefix_size: usize,

    /// A job the executor's queue rejected, kept boxed exactly as built so
    /// it can be resubmitted unchanged. `create_compression_job` refuses to
    /// build a new job while this is occupied, so submission order is never
    /// reordered around it.
    pending_job: Option<(u64, JobFn)>,

    target_prefix_size: usize,
    target_section_size: usize,
    in_buff_size: usize,
    single_blocking_thread: bool,

    consumed: u64,
    produced: u64,
    pledged_src_size: Option<u64>,
    w: u32,
}

fn window_log(block_size_id: crate::frame::types::BlockSizeId) -> u32 {
    crate::frame::header::lz4f_get_block_size(block_size_id)
        .unwrap_or(65536)
        .trailing_zeros()
}

impl<C: SectionCompressor + 'static, H: RollingHash64, E: JobExecutor + 'static> StreamCtx<C, H, E> {
    pub fn new(
        params: MtParams,
        frame_prefs: Preferences,
        owned_cdict: Option<Box<Lz4FCDict>>,
        hash: H,
        executor: E,
    ) -> Self {
        let nb_threads = params.nb_threads.max(1);
        let shared = Arc::new(Shared {
            buffer_pool: BufferPool::new(nb_threads, JOBSIZE_MIN),
            cctx_pool: CCtxPool::new(nb_threads),
            table: Mutex::new(JobTable::with_capacity_for(nb_threads + 2)),
            condvar: Condvar::new(),
        });

        StreamCtx {
            shared,
            executor: Arc::new(executor),
            hash,
            params,
            frame_prefs,
            owned_cdict,
            in_buff: None,
            in_filled: 0,
            prefix_size: 0,
            pending_job: None,
            target_prefix_size: 0,
            target_section_size: 0,
            in_buff_size: 0,
            single_blocking_thread: false,
            consumed: 0,
            produced: 0,
            pledged_src_size: None,
            w: 16,
        }
    }

    /// `init`: resets counters and computes sizing. Allocates nothing.
    pub fn init(&mut self, pledged_src_size: Option<u64>) {
        self.w = window_log(self.frame_prefs.frame_info.block_size_id);
        let overlap_log = self.params.effective_overlap_log();

        self.target_prefix_size = if overlap_log == 0 {
            0
        } else {
            1usize << self.w.saturating_sub(9 - overlap_log.min(9))
        };

        let job_size = if self.params.job_size == 0 {
            let auto = 1usize << (self.w + 2);
            if self.w >= 29 {
                JOBSIZE_MAX
            } else {
                auto.min(JOBSIZE_MAX)
            }
        } else {
            self.params.job_size
        };
        self.target_section_size = job_size.max(JOBSIZE_MIN).max(self.target_prefix_size);
        self.in_buff_size = self.target_prefix_size + self.target_section_size;

        self.single_blocking_thread =
            matches!(pledged_src_size, Some(n) if n as usize <= JOBSIZE_MIN);

        self.shared.buffer_pool.set_target_size(self.in_buff_size);

        self.in_buff = None;
        self.in_filled = 0;
        self.prefix_size = 0;
        self.pending_job = None;
        self.consumed = 0;
        self.produced = 0;
        self.pledged_src_size = pledged_src_size;

        self.shared.table.lock().unwrap().reset_for_new_session();
    }

    /// `createCompressionJob(srcSize, endFrame)`.
    fn create_compression_job(&mut self, end_frame: bool) -> Result<(), MtError> {
        self.retry_pending_dispatch();
        if self.pending_job.is_some() {
            // Still backed up from an earlier rejection: don't build a
            // second job on top of one the executor hasn't accepted yet,
            // or `next_job_id` would get ahead of what was actually queued.
            return Ok(());
        }

        {
            let t = self.shared.table.lock().unwrap();
            if t.next_job_id.wrapping_sub(t.done_job_id) > t.mask() as u64 {
                return Ok(()); // ring full; caller retries after flushing
            }
        }

        let src = self.in_buff.take().unwrap_or(PooledBuffer(Vec::new()));
        let src_size = self.in_filled.saturating_sub(self.prefix_size);
        let prefix_size = self.prefix_size;
        let first_chunk = self.produced == 0 && self.consumed == 0 && {
            self.shared.table.lock().unwrap().next_job_id == 0
        };

        let mut prefs = self.frame_prefs;
        if !first_chunk {
            // Non-first jobs never carry the frame-internal checksum flag;
            // the trailing checksum is written only once, centrally.
            prefs.frame_info.content_checksum_flag = ContentChecksum::Disabled;
        }
        let frame_checksum_needed =
            end_frame && self.params.checksum_flag && !first_chunk;
        if end_frame && first_chunk {
            // Single-chunk frame: the worker's own `end` call already omits
            // the checksum (disabled above is skipped for single-chunk too,
            // since this is the only job and the orchestrator still owns
            // the trailer — handled uniformly by `frame_checksum_needed`).
            prefs.frame_info.content_checksum_flag = ContentChecksum::Disabled;
        }

        let cdict = if first_chunk {
            self.owned_cdict
                .as_deref()
                .map(|c| SyncCDictPtr(c as *const Lz4FCDict))
        } else {
            None
        };

        let params = SectionParams {
            prefs,
            force_max_window: !first_chunk,
        };

        let pledged = if first_chunk {
            self.pledged_src_size.unwrap_or(0)
        } else {
            src_size as u64
        };

        let tail_bytes = if !end_frame {
            let new_prefix_size = (src_size + prefix_size).min(self.target_prefix_size);
            let tail_start = prefix_size + src_size - new_prefix_size;
            let tail_end = prefix_size + src_size;
            Some(src.0[tail_start..tail_end].to_vec())
        } else {
            None
        };

        let input = JobInput {
            src,
            prefix_size,
            src_size,
            full_frame_size: pledged,
            first_chunk,
            last_chunk: end_frame,
            params,
            cdict,
        };

        let job_id = {
            let t = self.shared.table.lock().unwrap();
            t.next_job_id
        };

        if let Some(tail) = tail_bytes {
            match self.shared.buffer_pool.acquire() {
                Some(mut next) => {
                    if next.0.len() < tail.len() {
                        next.0.resize(tail.len(), 0);
                    }
                    next.0[..tail.len()].copy_from_slice(&tail);
                    self.in_filled = tail.len();
                    self.prefix_size = tail.len();
                    self.in_buff = Some(next);
                }
                None => {
                    self.in_buff = None;
                    self.in_filled = 0;
                }
            }
        } else {
            self.in_buff = None;
            self.in_filled = 0;
            self.shared.table.lock().unwrap().frame_ended = true;
        }

        {
            let mut t = self.shared.table.lock().unwrap();
            t.slot_mut(job_id).frame_checksum_needed = frame_checksum_needed;
        }

        self.dispatch(job_id, input);
        Ok(())
    }

    fn dispatch(&mut self, job_id: u64, input: JobInput) {
        let shared = Arc::clone(&self.shared);
        let job: JobFn = Box::new(move || {
            run_job(
                job_id,
                input,
                &shared.table,
                &shared.condvar,
                &shared.buffer_pool,
                &shared.cctx_pool,
            );
        });
        self.try_dispatch_job(job_id, job);
    }

    /// Submits `job` (already built for `job_id`). If the executor's queue
    /// is full, the same boxed job is kept in `pending_job` instead of being
    /// dropped, so the section it was built from is not lost — it is
    /// retried, unchanged, the next time a streaming call reaches dispatch.
    fn try_dispatch_job(&mut self, job_id: u64, job: JobFn) {
        match self.executor.try_submit(job) {
            None => {
                let mut t = self.shared.table.lock().unwrap();
                t.next_job_id += 1;
            }
            Some(job) => {
                self.pending_job = Some((job_id, job));
            }
        }
    }

    /// Resubmits a previously-rejected job, if any. A no-op when there is
    /// none pending.
    fn retry_pending_dispatch(&mut self) {
        if let Some((job_id, job)) = self.pending_job.take() {
            self.try_dispatch_job(job_id, job);
        }
    }

    /// `flushProduced(output, block)`.
    fn flush_produced(&mut self, output: &mut [u8], block: bool) -> Result<usize, MtError> {
        let mut written_total = 0usize;
        loop {
            if written_total >= output.len() {
                return Ok(written_total);
            }

            let mut t = self.shared.table.lock().unwrap();
            if t.done_job_id >= t.next_job_id {
                return Ok(written_total);
            }

            loop {
                if t.slot(t.done_job_id).job_completed {
                    break;
                }
                if !block {
                    return Ok(written_total);
                }
                t = self.shared.condvar.wait(t).unwrap();
            }

            if let Err(e) = t.slot(t.done_job_id).c_size {
                self.drain_all_locked(t);
                return Err(e);
            }

            let done_job_id = t.done_job_id;
            if t.slot(done_job_id).frame_checksum_needed {
                let digest = self.hash.digest() as u32;
                let slot = t.slot_mut(done_job_id);
                let c_size = slot.c_size.unwrap();
                if let Some(dst) = slot.dst_buf.as_mut() {
                    if dst.0.len() < c_size + 4 {
                        dst.0.resize(c_size + 4, 0);
                    }
                    dst.0[c_size..c_size + 4].copy_from_slice(&digest.to_le_bytes());
                }
                slot.c_size = Ok(c_size + 4);
                slot.frame_checksum_needed = false;
            }

            let (copy_len, fully_drained, job_consumed, job_c_size);
            {
                let slot = t.slot_mut(done_job_id);
                let c_size = slot.c_size.unwrap();
                let avail = c_size - slot.dst_flushed;
                let remaining_out = output.len() - written_total;
                let n = avail.min(remaining_out);
                if let Some(dst) = slot.dst_buf.as_ref() {
                    output[written_total..written_total + n]
                        .copy_from_slice(&dst.0[slot.dst_flushed..slot.dst_flushed + n]);
                }
                slot.dst_flushed += n;
                copy_len = n;
                fully_drained = slot.dst_flushed >= c_size;
                job_consumed = slot.consumed;
                job_c_size = c_size as u64;
            }
            written_total += copy_len;

            if fully_drained {
                let slot = t.slot_mut(done_job_id);
                let released = slot.dst_buf.take();
                slot.reset();
                t.done_job_id += 1;
                self.consumed += job_consumed;
                self.produced += job_c_size;
                drop(t);
                self.shared.buffer_pool.release(released);
            } else {
                return Ok(written_total);
            }
        }
    }

    /// Drains every submitted-but-unconsumed job after an error, reclaiming
    /// pool buffers, before surfacing the error to the caller.
    fn drain_all_locked<'a>(&'a self, mut t: std::sync::MutexGuard<'a, JobTable>) {
        loop {
            if t.done_job_id >= t.next_job_id {
                break;
            }
            if !t.slot(t.done_job_id).job_completed {
                t = self.shared.condvar.wait(t).unwrap();
                continue;
            }
            let done_job_id = t.done_job_id;
            let slot = t.slot_mut(done_job_id);
            let buf = slot.dst_buf.take();
            slot.reset();
            self.shared.buffer_pool.release(buf);
            t.done_job_id += 1;
        }
        t.frame_ended = true;
        t.all_jobs_completed = true;
    }

    /// The top-level streaming step: ingest, maybe dispatch a job, flush.
    /// Returns `(bytes_written_to_output, bytes_consumed_from_input)`.
    pub fn compress_stream(
        &mut self,
        output: &mut [u8],
        input: &[u8],
        end_op: EndOp,
    ) -> Result<(usize, usize), MtError> {
        if self.shared.table.lock().unwrap().frame_ended && end_op == EndOp::Continue {
            return Err(MtError::StageWrong);
        }

        self.retry_pending_dispatch();

        if self.single_blocking_thread {
            return self.compress_single_blocking(output, input, end_op);
        }

        let no_jobs_yet = self.shared.table.lock().unwrap().next_job_id == 0;
        if no_jobs_yet
            && self.in_filled == 0
            && end_op == EndOp::End
            && output.len() >= C::compress_bound(input.len()) + crate::frame::types::MAX_FH_SIZE
        {
            let n = crate::mtctx::oneshot::compress_oneshot_mt::<C, H>(
                input,
                output,
                self.owned_cdict.as_deref(),
                &self.params,
                &self.frame_prefs,
                &mut self.hash,
                &self.shared.buffer_pool,
                &self.shared.cctx_pool,
            )?;
            let mut t = self.shared.table.lock().unwrap();
            t.frame_ended = true;
            t.all_jobs_completed = true;
            self.consumed += input.len() as u64;
            self.produced += n as u64;
            return Ok((n, input.len()));
        }

        if self.in_buff.is_none() {
            self.in_buff = Some(
                self.shared
                    .buffer_pool
                    .acquire()
                    .ok_or(MtError::MemoryAllocation)?,
            );
            self.in_filled = self.prefix_size;
        }

        let consumed_in;
        {
            let cap = self.in_buff_size.max(self.prefix_size);
            let buf = self.in_buff.as_mut().unwrap();
            if buf.0.len() < cap {
                buf.0.resize(cap, 0);
            }
            let room = cap.saturating_sub(self.in_filled);
            let n = room.min(input.len());
            buf.0[self.in_filled..self.in_filled + n].copy_from_slice(&input[..n]);
            if self.params.checksum_flag {
                self.hash.update(&input[..n]);
            }
            self.in_filled += n;
            consumed_in = n;
        }

        let mut end_op = end_op;
        if end_op == EndOp::End && consumed_in < input.len() {
            end_op = EndOp::Flush;
        }

        let staged_payload = self.in_filled.saturating_sub(self.prefix_size);
        let frame_not_closed = !self.shared.table.lock().unwrap().frame_ended;
        let should_create_job = staged_payload >= self.target_section_size
            || ((end_op == EndOp::Flush || end_op == EndOp::End) && staged_payload > 0)
            || (end_op == EndOp::End && frame_not_closed);

        if should_create_job {
            self.create_compression_job(end_op == EndOp::End)?;
        }

        let forward_input_progress = consumed_in > 0;
        let written = self.flush_produced(output, !forward_input_progress)?;

        Ok((written, consumed_in))
    }

    /// `pledgedSrcSize <= JOBSIZE_MIN`: route straight to a single inner
    /// compressor call with no worker activity, matching the boundary
    /// behavior in spec.md §8.
    fn compress_single_blocking(
        &mut self,
        output: &mut [u8],
        input: &[u8],
        end_op: EndOp,
    ) -> Result<(usize, usize), MtError> {
        if end_op != EndOp::End {
            self.in_buff.get_or_insert_with(|| PooledBuffer(Vec::new()));
            let buf = self.in_buff.as_mut().unwrap();
            buf.0.extend_from_slice(input);
            if self.params.checksum_flag {
                self.hash.update(input);
            }
            return Ok((0, input.len()));
        }

        let mut combined = self.in_buff.take().map(|b| b.0).unwrap_or_default();
        combined.extend_from_slice(input);
        if self.params.checksum_flag {
            self.hash.update(input);
        }

        let n = crate::mtctx::oneshot::compress_oneshot_mt::<C, H>(
            &combined,
            output,
            self.owned_cdict.as_deref(),
            &self.params,
            &self.frame_prefs,
            &mut self.hash,
            &self.shared.buffer_pool,
            &self.shared.cctx_pool,
        )?;
        let mut t = self.shared.table.lock().unwrap();
        t.frame_ended = true;
        t.all_jobs_completed = true;
        self.consumed += combined.len() as u64;
        self.produced += n as u64;
        Ok((n, input.len()))
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn produced(&self) -> u64 {
        self.produced
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.shared.table.lock().unwrap().all_jobs_completed
    }

    /// Reclaims the dictionary handle this session was constructed with, so a
    /// caller reusing the same dictionary across multiple files (e.g. batch
    /// compression) doesn't have to re-digest it per file.
    pub fn take_cdict(&mut self) -> Option<Box<Lz4FCDict>> {
        self.owned_cdict.take()
    }

    /// Blocks until every worker submitted so far has finished. Used by the
    /// `Drop` impl to implement destruction step (a) — quiesce and join the
    /// thread pool before any pool/job-table state is reclaimed.
    pub(crate) fn join_workers(&self) {
        self.executor.join_all();
    }
}
