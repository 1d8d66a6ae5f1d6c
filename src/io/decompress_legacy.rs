//! Decompression of the LZ4 legacy format (magic `0x184C2102`).
//!
//! The legacy format is a stream of size-prefixed LZ4 block-compressed chunks.
//! Each chunk is preceded by a 4-byte little-endian block size; a value that
//! exceeds `LZ4_COMPRESSBOUND(LEGACY_BLOCKSIZE)` is not a valid block size —
//! it is the magic number of the next chained frame, to be returned to the
//! caller for dispatch.
//!
//! # API
//!
//! [`decode_legacy_stream`] is the main entry point.  It expects the stream
//! positioned immediately after the consumed magic number and writes
//! decompressed output to any `impl Write`.  On success it returns the total
//! number of decoded bytes and, if a chained-frame magic was encountered, that
//! magic value so the caller can dispatch the next frame.
//!
//! # Threading
//!
//! When `prefs.nb_workers > 1` the multi-threaded path reads compressed blocks
//! in batches of [`NB_BUFFSETS`] and decompresses each batch in parallel via
//! rayon, then writes results in order on the calling thread.  The
//! single-threaded path processes one block at a time.
//!
//! Sparse-write optimisation is intentionally left to the caller
//! (`decompress_dispatch`), which holds a direct `&mut File`.  A generic
//! `impl Write` cannot safely assume sparse-hole support.

use std::io::{self, Read, Write};

use crate::block::compress::compress_bound;
use crate::block::decompress_api::decompress_safe;
use rayon::prelude::*;

use crate::io::decompress_resources::DecompressResources;
use crate::io::prefs::{Prefs, LEGACY_BLOCKSIZE};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Batch size for the multi-threaded decompression loop.
///
/// Four buffer sets allow one set to be filling, one decompressing, one
/// writing, and one queued simultaneously — matching the natural pipeline
/// depth of the MT path.
const NB_BUFFSETS: usize = 4;

/// Byte length of the block-size header field in the legacy stream format.
const LEGACY_BLOCK_HEADER_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns the maximum compressed size of a `LEGACY_BLOCKSIZE`-byte input block.
///
/// Block-size values read from the stream that exceed this bound are not valid
/// compressed sizes; they are treated as magic numbers for a chained frame.
fn lz4_compress_bound() -> usize {
    compress_bound(LEGACY_BLOCKSIZE as i32) as usize
}

/// Reads exactly `buf.len()` bytes, returning `Ok(false)` on a clean EOF
/// encountered before the first byte, `Ok(true)` on success, or an error if
/// EOF occurs mid-read.
///
/// Used when reading the 4-byte block header so that a clean end-of-stream
/// is not treated as an I/O error.
fn read_exact_or_eof<R: Read>(src: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    // A single-byte read distinguishes a clean EOF (n == 0) from a
    // short read mid-header, which would be a truncated stream.
    let n = src.read(&mut buf[..1])?;
    if n == 0 {
        return Ok(false); // clean end-of-stream
    }
    // Any EOF while reading the remaining bytes is a truncation error.
    src.read_exact(&mut buf[1..])?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Decompresses a legacy-format LZ4 stream from `src` into `dst`.
///
/// # Legacy format
///
/// Each block is preceded by a 4-byte little-endian block size.  If the block
/// size exceeds `LZ4_COMPRESSBOUND(LEGACY_BLOCKSIZE)`, the value is not a
/// valid compressed block size and is instead a magic number for the next
/// chained frame.
///
/// # Return value
///
/// `Ok((decoded_bytes, next_magic))` where `next_magic` is `Some(magic)` when
/// the stream ended because a next-stream magic number was encountered, or
/// `None` when it ended at clean EOF.
///
/// # Errors
///
/// Returns `Err` on any I/O error or on corrupted compressed data.
///
pub fn decode_legacy_stream<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
    prefs: &Prefs,
    _resources: &DecompressResources,
) -> io::Result<(u64, Option<u32>)> {
    if prefs.nb_workers > 1 {
        decode_legacy_mt(src, dst, prefs)
    } else {
        decode_legacy_st(src, dst)
    }
}

// ---------------------------------------------------------------------------
// Single-threaded path
// ---------------------------------------------------------------------------

/// Single-threaded legacy decompression loop.
///
/// Reads one block at a time: reads the 4-byte size header, validates it
/// against the compress bound, reads the compressed payload, decompresses it,
/// and writes the result to `dst`.  Repeats until clean EOF or a chained-frame
/// magic number is encountered.
fn decode_legacy_st<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
) -> io::Result<(u64, Option<u32>)> {
    let compress_bound = lz4_compress_bound();
    let mut header = [0u8; LEGACY_BLOCK_HEADER_SIZE];
    let mut in_buf = vec![0u8; compress_bound];
    let mut stream_size: u64 = 0;
    let mut next_magic: Option<u32> = None;

    loop {
        // Clean EOF before the block header means the stream ended normally.
        if !read_exact_or_eof(src, &mut header)? {
            break;
        }

        // Decode the little-endian block-size header.
        let block_size = u32::from_le_bytes(header);

        if block_size as usize > compress_bound {
            // Value exceeds the maximum compressed block size — it is the
            // magic number of a chained frame.  Return it for dispatch.
            next_magic = Some(block_size);
            break;
        }

        let block_len = block_size as usize;
        src.read_exact(&mut in_buf[..block_len])?;

        // Decompress the block; any decompressor error is treated as
        // corrupted input and surfaced as an InvalidData I/O error.
        let mut dec_buf = vec![0u8; LEGACY_BLOCKSIZE];
        let dec_n = decompress_safe(&in_buf[..block_len], &mut dec_buf).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Decoding Failed! Corrupted input detected!: {e:?}"),
            )
        })?;;

        stream_size += dec_n as u64;
        dst.write_all(&dec_buf[..dec_n])?;
    }

    // I/O errors from read_exact_or_eof / read_exact propagate as Err;
    // no separate error-state check is needed.

    Ok((stream_size, next_magic))
}

// ---------------------------------------------------------------------------
// Multi-threaded path
// ---------------------------------------------------------------------------

/// Multi-threaded legacy decompression using rayon batch parallelism.
///
/// Reads compressed blocks in batches of [`NB_BUFFSETS`], decompresses each
/// batch in parallel with rayon, then writes decompressed output in order on
/// the calling thread.
///
/// A fully pipelined design with a dedicated write thread is not possible
/// because `Write` is not `Send`.  The rayon batch approach achieves the same
/// CPU-bound throughput with safe Rust by decoupling the decompression work
/// from the serial write step.
fn decode_legacy_mt<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
    _prefs: &Prefs,
) -> io::Result<(u64, Option<u32>)> {
    let compress_bound = lz4_compress_bound();
    let mut stream_size: u64 = 0;
    let mut next_magic: Option<u32> = None;

    loop {
        // ── Read a batch of up to NB_BUFFSETS compressed blocks ─────────────
        let mut batch: Vec<Vec<u8>> = Vec::with_capacity(NB_BUFFSETS);
        let mut batch_done = false; // set when EOF or a chained-frame magic is found

        for _ in 0..NB_BUFFSETS {
            let mut header = [0u8; LEGACY_BLOCK_HEADER_SIZE];

            // Clean EOF before a block header means the stream ended normally.
            if !read_exact_or_eof(src, &mut header)? {
                batch_done = true;
                break;
            }

            let block_size = u32::from_le_bytes(header);
            if block_size as usize > compress_bound {
                // Value exceeds the maximum compressed block size — treat as
                // a chained-frame magic number and stop reading this stream.
                next_magic = Some(block_size);
                batch_done = true;
                break;
            }

            let mut block = vec![0u8; block_size as usize];
            src.read_exact(&mut block)?;
            batch.push(block);
        }

        if batch.is_empty() {
            break;
        }

        // ── Decompress batch in parallel ──────────────────────────────────────
        // Each block is independent, so rayon can decompress them concurrently.
        // Results are collected into a Vec to preserve ordering before writing.
        let results: Vec<io::Result<Vec<u8>>> = batch
            .par_iter()
            .map(|block| {
                let mut dec_buf = vec![0u8; LEGACY_BLOCKSIZE];
                let n = decompress_safe(block, &mut dec_buf).map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Decoding Failed! Corrupted input detected!: {e:?}"),
                    )
                })?;
                dec_buf.truncate(n);
                Ok(dec_buf)
            })
            .collect();

        // ── Write results in order ────────────────────────────────────────────
        // Propagate any decompression error from the parallel batch before
        // writing; this ensures output is never partially written on error.
        for result in results {
            let decompressed = result?;
            stream_size += decompressed.len() as u64;
            dst.write_all(&decompressed)?;
        }

        if batch_done {
            break;
        }
    }

    Ok((stream_size, next_magic))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
