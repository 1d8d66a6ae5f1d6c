//! The single-section compressor contract and its concrete LZ4 frame backend.
//!
//! The orchestrator treats the inner compressor as an external collaborator
//! reachable only through `begin` / `continue_block` / `end`. The concrete
//! backend reuses the teacher's existing LZ4 frame implementation
//! (`frame::compress`, `frame::header`, `frame::types`) instead of inventing
//! a second compressor.

use crate::frame::cdict::Lz4FCDict;
use crate::frame::compress::{
    lz4f_compress_begin, lz4f_compress_begin_using_cdict, lz4f_compress_begin_using_dict,
    lz4f_compress_bound, lz4f_compress_end, lz4f_compress_update, lz4f_create_compression_context,
    LZ4F_VERSION,
};
use crate::frame::types::{ContentChecksum, Lz4FCCtx};
use crate::mtctx::error::MtError;
use crate::mtctx::params::SectionParams;

/// Dictionary source presented to [`SectionCompressor::begin`].
pub enum Dict<'a> {
    /// No dictionary: job 0 with no prefix history (e.g. empty input).
    None,
    /// A pre-digested dictionary handle (job 0 only).
    Cdict(*const Lz4FCDict),
    /// Raw prefix bytes used as a content-only dictionary (every non-first
    /// chunk, or job 0 when no cdict was supplied).
    RawContent(&'a [u8]),
}

/// The external single-section-compressor contract consumed by the
/// orchestrator and worker routine.
///
/// A trait rather than a concrete type so the orchestrator core stays
/// testable against a mock implementation.
pub trait SectionCompressor: Send {
    /// `create(customAlloc) -> ctx`. Returns `None` on allocation failure.
    fn create() -> Option<Self>
    where
        Self: Sized;

    /// Returns the context to a pristine, reusable state (`reset(ctx, pledged)`
    /// without the pledged-size argument, which `begin` re-supplies).
    fn reset(&mut self);

    /// Writes the frame header (job 0) or, for non-first chunks, a header's
    /// worth of bytes meant to be discarded by the caller. Returns the
    /// number of bytes written to `dst`.
    fn begin(
        &mut self,
        dst: &mut [u8],
        dict: Dict<'_>,
        params: &SectionParams,
        pledged_size: u64,
    ) -> Result<usize, MtError>;

    /// Compresses one block, appending it to `dst`. May return `0` when the
    /// data is buffered internally rather than flushed immediately.
    fn continue_block(&mut self, dst: &mut [u8], src: &[u8]) -> Result<usize, MtError>;

    /// Flushes any buffered bytes plus `src` (if non-empty), then writes the
    /// end-of-block marker and frame epilogue (excluding the trailing
    /// checksum, which the orchestrator owns).
    fn end(&mut self, dst: &mut [u8], src: &[u8]) -> Result<usize, MtError>;

    /// `invalidateRepCodes(ctx)` — no-op for a backend with no persistent
    /// repeat-match state (see the LZ4 impl below).
    fn invalidate_rep_codes(&mut self);

    /// `CCtxParam_setParameter(params, "forceMaxWindow", bool)`.
    fn set_force_max_window(&mut self, force: bool);

    /// `compressBound(n)`, superadditive for `n >= 256 KiB`.
    fn compress_bound(src_size: usize) -> usize
    where
        Self: Sized;
}

/// Concrete backend: the LZ4 frame format context already implemented by
/// `frame::compress`.
pub struct Lz4SectionCompressor {
    cctx: Box<Lz4FCCtx>,
}

impl SectionCompressor for Lz4SectionCompressor {
    fn create() -> Option<Self> {
        let cctx = lz4f_create_compression_context(LZ4F_VERSION).ok()?;
        Some(Lz4SectionCompressor { cctx })
    }

    fn reset(&mut self) {
        self.cctx.c_stage = 0;
    }

    fn begin(
        &mut self,
        dst: &mut [u8],
        dict: Dict<'_>,
        params: &SectionParams,
        pledged_size: u64,
    ) -> Result<usize, MtError> {
        let mut prefs = params.prefs;
        prefs.frame_info.content_size = pledged_size;
        // The frame-internal checksum is never used: the orchestrator's own
        // rolling hash is the single source of truth for the trailer,
        // exactly as `io::compress_mt` already does for its own checksum.
        prefs.frame_info.content_checksum_flag = ContentChecksum::Disabled;

        match dict {
            Dict::Cdict(ptr) => {
                if ptr.is_null() {
                    return Err(MtError::DictionaryWrong);
                }
                // SAFETY: the caller guarantees `ptr` outlives this call.
                unsafe { lz4f_compress_begin_using_cdict(&mut self.cctx, dst, ptr, Some(&prefs)) }
                    .map_err(MtError::from)
            }
            Dict::RawContent(prefix) if !prefix.is_empty() => {
                lz4f_compress_begin_using_dict(&mut self.cctx, dst, prefix, Some(&prefs))
                    .map_err(MtError::from)
            }
            _ => lz4f_compress_begin(&mut self.cctx, dst, Some(&prefs)).map_err(MtError::from),
        }
    }

    fn continue_block(&mut self, dst: &mut [u8], src: &[u8]) -> Result<usize, MtError> {
        lz4f_compress_update(&mut self.cctx, dst, src, None).map_err(MtError::from)
    }

    fn end(&mut self, dst: &mut [u8], src: &[u8]) -> Result<usize, MtError> {
        let mut written = 0;
        if !src.is_empty() {
            written += lz4f_compress_update(&mut self.cctx, dst, src, None).map_err(MtError::from)?;
        }
        written += lz4f_compress_end(&mut self.cctx, &mut dst[written..], None)
            .map_err(MtError::from)?;
        Ok(written)
    }

    fn invalidate_rep_codes(&mut self) {
        // LZ4 frame blocks carry no persistent repeat-match state analogous
        // to zstd's repcodes, so there is nothing to invalidate. Kept as a
        // trait method so a future stateful backend can implement it.
    }

    fn set_force_max_window(&mut self, _force: bool) {
        // The LZ4 frame format has no window-log parameter equivalent to
        // zstd's; this is an intentional no-op for this backend.
    }

    fn compress_bound(src_size: usize) -> usize {
        // `lz4f_compress_bound` (not `lz4f_compress_frame_bound`) omits the
        // once-per-frame `MAX_FH_SIZE` header margin, which is the correct
        // "section continuation" bound: only job 0 pays for the real header.
        lz4f_compress_bound(src_size, None)
    }
}
