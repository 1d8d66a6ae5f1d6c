//! The single-job pipeline run on a thread-pool worker.
//!
//! Grounded on `io::compress_frame::compress_frame_chunk`'s begin/continue
//! shape, generalized to a block loop and to the non-first-chunk
//! header-overwrite: instead of a separate dummy `continue(src, 0)` call,
//! the section's block loop is simply pointed at `dst[0..]` rather than
//! `dst[header_len..]`, so the first real block of compressed output lands
//! exactly where the (to-be-discarded) header was written by `begin`. Same
//! effect, one fewer call.

use std::sync::{Condvar, Mutex};

use crate::frame::header::lz4f_get_block_size;
use crate::frame::types::BlockSizeId;
use crate::mtctx::buffer_pool::BufferPool;
use crate::mtctx::cctx_pool::CCtxPool;
use crate::mtctx::error::MtError;
use crate::mtctx::job::{JobInput, JobTable};
use crate::mtctx::section::{Dict, SectionCompressor};

/// Runs one job to completion, writing the outcome into `table`'s slot for
/// `job_id` and notifying `condvar` once (on success or on error — the job
/// always completes).
pub fn run_job<C: SectionCompressor>(
    job_id: u64,
    input: JobInput,
    table: &Mutex<JobTable>,
    condvar: &Condvar,
    buffer_pool: &BufferPool,
    cctx_pool: &CCtxPool<C>,
) {
    let src_size = input.src_size as u64;
    let outcome = compress_one(input, buffer_pool, cctx_pool);

    let mut guard = table.lock().unwrap();
    let slot = guard.slot_mut(job_id);
    match outcome {
        Ok((dst, c_size)) => {
            slot.dst_buf = Some(dst);
            slot.c_size = Ok(c_size);
        }
        Err(e) => {
            slot.c_size = Err(e);
        }
    }
    slot.consumed = src_size;
    slot.job_completed = true;
    condvar.notify_all();
    drop(guard);
}

/// Does the actual compression work, outside the completion lock. Returns
/// the filled destination buffer and the number of compressed bytes written
/// to it, or the first error encountered. Release step 6 ("release context
/// and srcBuf back to their pools") applies to both the success and error
/// paths: `input.src` always goes back to `buffer_pool` here.
fn compress_one<C: SectionCompressor>(
    input: JobInput,
    buffer_pool: &BufferPool,
    cctx_pool: &CCtxPool<C>,
) -> Result<(crate::mtctx::buffer_pool::PooledBuffer, usize), MtError> {
    let mut cctx = cctx_pool.acquire().ok_or(MtError::MemoryAllocation)?;
    let mut dst = buffer_pool.acquire().ok_or(MtError::MemoryAllocation)?;

    let result = (|| {
        let full = &input.src.0[..input.prefix_size + input.src_size];
        let prefix = &full[..input.prefix_size];
        let payload = &full[input.prefix_size..];

        cctx.set_force_max_window(!input.first_chunk);

        let pledged = if input.first_chunk {
            input.full_frame_size
        } else {
            input.src_size as u64
        };

        let dict = if input.first_chunk {
            match input.cdict {
                Some(ptr) => Dict::Cdict(ptr.0),
                None => Dict::RawContent(prefix),
            }
        } else {
            Dict::RawContent(prefix)
        };

        let header_len = cctx.begin(&mut dst.0, dict, &input.params, pledged)?;

        if !input.first_chunk {
            // Header overwrite: the block loop below starts writing at 0,
            // discarding the header `begin` just wrote. No separate dummy
            // `continue` call, and no persistent repeat-match state in this
            // backend to invalidate (see `Lz4SectionCompressor::invalidate_rep_codes`).
            cctx.invalidate_rep_codes();
        }

        let mut pos = if input.first_chunk { header_len } else { 0 };
        let block_max =
            lz4f_get_block_size(input.params.prefs.frame_info.block_size_id).unwrap_or(65536);

        let mut offset = 0usize;
        while payload.len() - offset >= block_max {
            let block = &payload[offset..offset + block_max];
            pos += cctx.continue_block(&mut dst.0[pos..], block)?;
            offset += block_max;
        }
        let tail = &payload[offset..];

        if input.last_chunk {
            pos += cctx.end(&mut dst.0[pos..], tail)?;
        } else if !tail.is_empty() {
            pos += cctx.continue_block(&mut dst.0[pos..], tail)?;
        }

        Ok(pos)
    })();

    cctx_pool.release(cctx);
    buffer_pool.release(Some(input.src));

    match result {
        Ok(c_size) => Ok((dst, c_size)),
        Err(e) => {
            buffer_pool.release(Some(dst));
            Err(e)
        }
    }
}
