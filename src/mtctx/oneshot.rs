//! The one-shot (non-streaming) compression path.
//!
//! Partitions the whole input into sections up front, dispatches them with
//! `rayon` directly (bypassing the job table / completion mutex machinery —
//! those exist for the streaming path, where jobs outlive a single call),
//! and reassembles the frame. Grounded on `io::compress_mt`'s existing use
//! of `rayon::prelude::*` for whole-buffer parallel chunk compression.

use rayon::prelude::*;

use crate::frame::cdict::Lz4FCDict;
use crate::frame::header::lz4f_get_block_size;
use crate::frame::types::{BlockSizeId, ContentChecksum, Preferences};
use crate::mtctx::buffer_pool::{BufferPool, PooledBuffer};
use crate::mtctx::cctx_pool::CCtxPool;
use crate::mtctx::error::MtError;
use crate::mtctx::hash::RollingHash64;
use crate::mtctx::params::MtParams;
use crate::mtctx::section::{Dict, SectionCompressor};

/// `W`: an LZ4 analogue of zstd's window-log, derived from the configured
/// block size (the only "window"-like knob this frame format exposes).
/// `BlockSizeId::Max4Mb` (the largest) yields `W = 22`.
fn window_log(block_size_id: BlockSizeId) -> u32 {
    let bytes = lz4f_get_block_size(block_size_id).unwrap_or(65536);
    bytes.trailing_zeros()
}

struct Partition {
    nb_chunks: usize,
    avg: usize,
}

/// `spec.md` §4.4.1's partitioning formula, verbatim including the
/// pathological-tail bump rule.
fn partition(src_size: usize, nb_threads: usize, w: u32) -> Partition {
    let target_chunk = 1usize << (w + 2);
    let max_chunk = target_chunk << 2;
    let per_pass = max_chunk * nb_threads;

    let m = src_size / per_pass.max(1) + 1;
    let nb_chunks = if m > 1 {
        m * nb_threads
    } else {
        nb_threads.min(src_size / target_chunk.max(1) + 1)
    }
    .max(1);

    let mut avg = src_size.div_ceil(nb_chunks.max(1));
    if avg > 0 && ((avg - 1) & 0x1FFFF) >= 0x7FFF {
        avg += 0x10000;
    }
    Partition { nb_chunks, avg }
}

fn overlap_size(overlap_log: u32, w: u32) -> usize {
    if overlap_log == 0 {
        0
    } else {
        1usize << (w.saturating_sub(9 - overlap_log.min(9)))
    }
}

struct ChunkDesc {
    payload_start: usize,
    payload_len: usize,
    prefix_start: usize,
    prefix_len: usize,
    first: bool,
    last: bool,
}

fn build_chunk_descs(src_size: usize, avg: usize, overlap: usize) -> Vec<ChunkDesc> {
    let mut descs = Vec::new();
    let mut pos = 0;
    while pos < src_size || descs.is_empty() {
        let len = avg.min(src_size - pos);
        let prefix_len = overlap.min(pos);
        descs.push(ChunkDesc {
            payload_start: pos,
            payload_len: len,
            prefix_start: pos - prefix_len,
            prefix_len,
            first: pos == 0,
            last: pos + len >= src_size,
        });
        pos += len;
        if len == 0 {
            break;
        }
    }
    descs
}

/// Compresses `src` into `dst` in one call, returning the number of bytes
/// written to `dst`. `buffer_pool` backs chunks that don't fit a direct-to-
/// `dst` slot; `cctx_pool` backs the single-section fallback.
pub fn compress_oneshot_mt<C: SectionCompressor, H: RollingHash64>(
    src: &[u8],
    dst: &mut [u8],
    cdict: Option<&Lz4FCDict>,
    params: &MtParams,
    frame_prefs: &Preferences,
    hash: &mut H,
    buffer_pool: &BufferPool,
    cctx_pool: &CCtxPool<C>,
) -> Result<usize, MtError> {
    let nb_threads = params.nb_threads.max(1);
    let w = window_log(frame_prefs.frame_info.block_size_id);
    let part = partition(src.len(), nb_threads, w);

    if part.nb_chunks <= 1 || nb_threads <= 1 {
        return compress_single_section::<C, H>(src, dst, cdict, params, frame_prefs, hash, cctx_pool);
    }

    let overlap = overlap_size(params.effective_overlap_log(), w);
    let descs = build_chunk_descs(src.len(), part.avg, overlap);

    hash.reset(0);
    for d in &descs {
        hash.update(&src[d.payload_start..d.payload_start + d.payload_len]);
    }

    let section_params = |first: bool| crate::mtctx::params::SectionParams {
        prefs: {
            let mut p = *frame_prefs;
            // Only the orchestrator writes the trailing checksum, and only once.
            p.frame_info.content_checksum_flag = ContentChecksum::Disabled;
            p
        },
        force_max_window: !first,
    };
    let chunk_bound = |len: usize| C::compress_bound(len) + crate::frame::types::MAX_FH_SIZE;

    // Direct-to-dst optimization: `k = floor(dstCapacity / bound(avg))` leading
    // chunks compress straight into disjoint worst-case-sized slices of `dst`
    // (superadditivity guarantees their sum fits when `k == nb_chunks`); the
    // remaining `nb_chunks - k` chunks compress into pool buffers instead of
    // a scratch `Vec` per chunk, so memory use stays bounded by the pool.
    let avg_bound = chunk_bound(part.avg).max(1);
    let k = (dst.len() / avg_bound).min(descs.len());

    let mut direct_slots: Vec<&mut [u8]> = Vec::with_capacity(k);
    let mut rest: &mut [u8] = dst;
    for d in &descs[..k] {
        let bound = chunk_bound(d.payload_len).min(rest.len());
        let (head, tail) = rest.split_at_mut(bound);
        direct_slots.push(head);
        rest = tail;
    }

    let direct_sizes: Vec<Result<usize, MtError>> = descs[..k]
        .par_iter()
        .zip(direct_slots.par_iter_mut())
        .enumerate()
        .map(|(i, (d, slot))| {
            let mut cctx = C::create().ok_or(MtError::MemoryAllocation)?;
            compress_section(&mut cctx, slot, src, d, i == 0, cdict, &section_params(d.first))
        })
        .collect();

    let pooled: Vec<Result<(usize, PooledBuffer), MtError>> = descs[k..]
        .par_iter()
        .enumerate()
        .map(|(i, d)| -> Result<(usize, PooledBuffer), MtError> {
            let idx = k + i;
            let mut cctx = C::create().ok_or(MtError::MemoryAllocation)?;
            let bound = chunk_bound(d.payload_len);
            let mut buf = buffer_pool.acquire().ok_or(MtError::MemoryAllocation)?;
            if buf.0.len() < bound {
                buf.0.resize(bound, 0);
            }
            let cs = compress_section(
                &mut cctx,
                &mut buf.0[..bound],
                src,
                d,
                idx == 0,
                cdict,
                &section_params(d.first),
            )?;
            Ok((cs, buf))
        })
        .collect();

    // Reassemble in order: the direct region compacts first (closing the
    // per-slot gaps between each chunk's actual size and its worst-case
    // bound), then every pooled chunk's bytes are appended after it.
    let mut dst_pos = 0usize;
    let mut slot_off = 0usize;
    for (d, size) in descs[..k].iter().zip(direct_sizes) {
        let cs = size?;
        let bound = chunk_bound(d.payload_len).min(dst.len() - slot_off);
        dst.copy_within(slot_off..slot_off + cs, dst_pos);
        dst_pos += cs;
        slot_off += bound;
    }
    for r in pooled {
        let (cs, buf) = r?;
        if dst_pos + cs > dst.len() {
            buffer_pool.release(Some(buf));
            return Err(MtError::DstSizeTooSmall);
        }
        dst[dst_pos..dst_pos + cs].copy_from_slice(&buf.0[..cs]);
        dst_pos += cs;
        buffer_pool.release(Some(buf));
    }

    if params.checksum_flag {
        if dst_pos + 4 > dst.len() {
            return Err(MtError::DstSizeTooSmall);
        }
        let digest = hash.digest() as u32;
        dst[dst_pos..dst_pos + 4].copy_from_slice(&digest.to_le_bytes());
        dst_pos += 4;
    }

    Ok(dst_pos)
}

#[allow(clippy::too_many_arguments)]
fn compress_section<C: SectionCompressor>(
    cctx: &mut C,
    dst: &mut [u8],
    src: &[u8],
    d: &ChunkDesc,
    is_job_zero: bool,
    cdict: Option<&Lz4FCDict>,
    params: &crate::mtctx::params::SectionParams,
) -> Result<usize, MtError> {
    let prefix = &src[d.prefix_start..d.prefix_start + d.prefix_len];
    let payload = &src[d.payload_start..d.payload_start + d.payload_len];

    cctx.set_force_max_window(!d.first);

    let dict = if is_job_zero {
        match cdict {
            Some(cd) => Dict::Cdict(cd as *const Lz4FCDict),
            None => Dict::RawContent(prefix),
        }
    } else {
        Dict::RawContent(prefix)
    };

    let pledged = if d.first { src.len() as u64 } else { d.payload_len as u64 };
    let header_len = cctx.begin(dst, dict, params, pledged)?;
    if !d.first {
        cctx.invalidate_rep_codes();
    }
    let mut pos = if d.first { header_len } else { 0 };

    let block_max = lz4f_get_block_size(params.prefs.frame_info.block_size_id).unwrap_or(65536);
    let mut offset = 0;
    while payload.len() - offset >= block_max {
        let block = &payload[offset..offset + block_max];
        pos += cctx.continue_block(&mut dst[pos..], block)?;
        offset += block_max;
    }
    let tail = &payload[offset..];
    if d.last {
        pos += cctx.end(&mut dst[pos..], tail)?;
    } else if !tail.is_empty() {
        pos += cctx.continue_block(&mut dst[pos..], tail)?;
    }
    Ok(pos)
}

/// Fallback for `nbChunks == 1 || nbThreads <= 1`: single-context
/// compression of the whole input, no partitioning, no parallelism. Uses
/// the pool's seeded context rather than `C::create()` directly, exactly
/// the case `CCtxPool` keeps one eagerly-created context around for.
fn compress_single_section<C: SectionCompressor, H: RollingHash64>(
    src: &[u8],
    dst: &mut [u8],
    cdict: Option<&Lz4FCDict>,
    params: &MtParams,
    frame_prefs: &Preferences,
    hash: &mut H,
    cctx_pool: &CCtxPool<C>,
) -> Result<usize, MtError> {
    let mut cctx = cctx_pool.acquire().ok_or(MtError::MemoryAllocation)?;
    let section_params = crate::mtctx::params::SectionParams {
        prefs: {
            let mut p = *frame_prefs;
            p.frame_info.content_checksum_flag = ContentChecksum::Disabled;
            p
        },
        force_max_window: false,
    };
    let dict = match cdict {
        Some(cd) => Dict::Cdict(cd as *const Lz4FCDict),
        None => Dict::None,
    };
    let result = (|| -> Result<usize, MtError> {
        let header_len = cctx.begin(dst, dict, &section_params, src.len() as u64)?;
        let written = cctx.end(&mut dst[header_len..], src)?;
        Ok(header_len + written)
    })();
    cctx_pool.release(cctx);
    let mut total = result?;

    if params.checksum_flag {
        hash.reset(0);
        hash.update(src);
        if total + 4 > dst.len() {
            return Err(MtError::DstSizeTooSmall);
        }
        let digest = hash.digest() as u32;
        dst[total..total + 4].copy_from_slice(&digest.to_le_bytes());
        total += 4;
    }
    Ok(total)
}
