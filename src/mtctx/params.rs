//! Tunables and sizing constants for the multi-threaded orchestrator.
//!
//! `JOBSIZE_MIN` / `JOBSIZE_MAX` / `OVERLAPLOG_DEFAULT` are carried over
//! verbatim from `ZSTDMT_JOBSIZE_MIN` / `ZSTDMT_JOBSIZE_MAX` /
//! `ZSTDMT_OVERLAPLOG_DEFAULT` in `zstdmt_compress.c`; `NB_THREADS_MAX`
//! reuses the existing `config::NB_WORKERS_MAX` constant (both are 200).

use crate::config::{CLEVEL_DEFAULT, NB_WORKERS_MAX};
use crate::frame::header::LZ4HC_CLEVEL_MAX;
use crate::frame::types::Preferences;

/// Smallest payload a single job may carry, 512 KiB.
pub const JOBSIZE_MIN: usize = 512 * 1024;

/// Largest payload a single job may carry. 512 MiB on 32-bit targets
/// (address space pressure), 2 GiB elsewhere.
#[cfg(target_pointer_width = "32")]
pub const JOBSIZE_MAX: usize = 512 * 1024 * 1024;
#[cfg(not(target_pointer_width = "32"))]
pub const JOBSIZE_MAX: usize = 2 * 1024 * 1024 * 1024;

/// Default `overlap_section_log`.
pub const OVERLAPLOG_DEFAULT: u32 = 6;

/// Maximum allowed `overlap_section_log`.
pub const OVERLAPLOG_MAX: u32 = 9;

/// Minimum worker count.
pub const NB_THREADS_MIN: usize = 1;

/// Maximum worker count.
pub const NB_THREADS_MAX: usize = NB_WORKERS_MAX;

/// User-facing tunables for a multi-threaded compression session.
///
/// Mirrors the bullet list of tunables in the external-interfaces contract:
/// `nb_threads`, `job_size`, `overlap_section_log`, `compression_level`,
/// `checksum_flag`, `content_size_flag`.
#[derive(Debug, Clone, Copy)]
pub struct MtParams {
    pub nb_threads: usize,
    /// `0` means "auto-size from window/level"; otherwise `[JOBSIZE_MIN, JOBSIZE_MAX]`.
    pub job_size: usize,
    pub overlap_log: u32,
    pub compression_level: i32,
    pub checksum_flag: bool,
    pub content_size_flag: bool,
}

impl Default for MtParams {
    fn default() -> Self {
        MtParams {
            nb_threads: 1,
            job_size: 0,
            overlap_log: OVERLAPLOG_DEFAULT,
            compression_level: CLEVEL_DEFAULT,
            checksum_flag: false,
            content_size_flag: false,
        }
    }
}

impl MtParams {
    /// Clamp every field into its documented range.
    ///
    /// `job_size` is left at `0` if the caller asked for auto-sizing; a
    /// non-zero request is clamped into `[JOBSIZE_MIN, JOBSIZE_MAX]` rather
    /// than rejected.
    pub fn clamp(mut self) -> Self {
        self.nb_threads = self.nb_threads.clamp(NB_THREADS_MIN, NB_THREADS_MAX);
        if self.job_size != 0 {
            self.job_size = self.job_size.clamp(JOBSIZE_MIN, JOBSIZE_MAX);
        }
        self.overlap_log = self.overlap_log.min(OVERLAPLOG_MAX);
        self
    }

    /// Effective overlap log used for sizing: bumped to `OVERLAPLOG_MAX` when
    /// the caller left `overlap_log` at its default and asked for the
    /// strongest compression level, mirroring `ZSTDMT_computeOverlapLog`'s
    /// "auto" behavior at `ZSTD_maxCLevel()`.
    pub fn effective_overlap_log(&self) -> u32 {
        if self.overlap_log == OVERLAPLOG_DEFAULT && self.compression_level >= LZ4HC_CLEVEL_MAX {
            OVERLAPLOG_MAX
        } else {
            self.overlap_log
        }
    }
}

/// Per-job compression parameters handed to a [`SectionCompressor`](crate::mtctx::section::SectionCompressor).
///
/// Deliberately has no `nb_threads` field: a sub-job cannot recursively
/// request its own worker pool, which is the structural equivalent of the
/// original's `assert(jobParams.nbThreads == 0)`.
#[derive(Debug, Clone, Copy)]
pub struct SectionParams {
    pub prefs: Preferences,
    pub force_max_window: bool,
}
