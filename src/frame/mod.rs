//! LZ4 Frame format — streaming compression and decompression.
//!
//! Corresponds to lz4frame.c / lz4frame.h / lz4frame_static.h from LZ4 v1.10.0.

pub mod cdict;
pub mod compress;
pub mod decompress;
pub mod header;
pub mod types;

// Re-export key public API items at the module level.
pub use cdict::Lz4FCDict;
pub use compress::{
    lz4f_compress_begin, lz4f_compress_bound, lz4f_compress_end, lz4f_compress_frame,
    lz4f_compress_frame_using_cdict, lz4f_compress_update, lz4f_create_compression_context,
    lz4f_flush, lz4f_free_compression_context, lz4f_uncompressed_update, CompressOptions,
};
pub use header::lz4f_compress_frame_bound;
pub use decompress::{
    lz4f_create_decompression_context, lz4f_decompress, lz4f_decompress_using_dict,
    lz4f_free_decompression_context, lz4f_get_frame_info, lz4f_header_size,
    lz4f_reset_decompression_context, DecompressOptions, Lz4FDCtx,
};
pub use types::{
    BlockChecksum, BlockMode, BlockSizeId, ContentChecksum, FrameInfo, FrameType, Lz4FCCtx,
    Lz4FError, Preferences,
};

/// One-shot compress into a freshly allocated, exactly-sized `Vec`.
///
/// Convenience wrapper over [`lz4f_compress_frame`] for callers that don't
/// want to manage their own destination buffer.
pub fn compress_frame_to_vec(src: &[u8]) -> Vec<u8> {
    let bound = lz4f_compress_frame_bound(src.len(), None);
    let mut dst = vec![0u8; bound];
    let written =
        lz4f_compress_frame(&mut dst, src, None).expect("compress_frame_to_vec: compression failed");
    dst.truncate(written);
    dst
}

/// One-shot decompress of a complete frame into a freshly allocated `Vec`.
///
/// Grows the output buffer as `lz4f_decompress` reports more bytes are
/// needed, and bails out with [`Lz4FError::DecompressionFailed`] if a call
/// makes no progress on both `src` and `dst` — guards against a truncated or
/// otherwise malformed frame spinning forever asking for more input.
pub fn decompress_frame_to_vec(src: &[u8]) -> Result<Vec<u8>, Lz4FError> {
    if src.is_empty() {
        return Ok(Vec::new());
    }
    let mut dctx = lz4f_create_decompression_context(compress::LZ4F_VERSION)?;
    let mut out = Vec::new();
    let mut src_pos = 0usize;
    let mut chunk = vec![0u8; 4 * 1024 * 1024];
    loop {
        let (consumed, produced, hint) =
            lz4f_decompress(&mut dctx, Some(&mut chunk), &src[src_pos..], None)?;
        out.extend_from_slice(&chunk[..produced]);
        src_pos += consumed;
        if hint == 0 {
            return Ok(out);
        }
        if consumed == 0 && produced == 0 {
            return Err(Lz4FError::DecompressionFailed);
        }
        if src_pos >= src.len() && hint > 0 {
            return Err(Lz4FError::DecompressionFailed);
        }
    }
}
