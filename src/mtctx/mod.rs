//! Multi-threaded frame compression orchestrator.
//!
//! Partitions input into sections, compresses them across a fixed worker
//! pool, and reassembles a single coherent LZ4 frame. See `oneshot` for the
//! whole-buffer entry point and `streaming` for the incremental one.
//!
//! The external collaborators this orchestrator depends on (the
//! single-section compressor, the thread pool, the rolling hash) are all
//! traits, each with one concrete backend reusing existing teacher code:
//! `section::Lz4SectionCompressor`, `executor::MtThreadPool`,
//! `hash::Xxh64State`.

pub mod buffer_pool;
pub mod cctx_pool;
pub mod error;
pub mod executor;
pub mod hash;
pub mod job;
pub mod oneshot;
pub mod params;
pub mod section;
pub mod streaming;
pub mod worker;

pub use error::MtError;
pub use executor::{JobExecutor, MtThreadPool};
pub use hash::{RollingHash64, Xxh64State};
pub use oneshot::compress_oneshot_mt;
pub use params::MtParams;
pub use section::{Lz4SectionCompressor, SectionCompressor};
pub use streaming::{EndOp, StreamCtx};

impl<C, H, E> Drop for streaming::StreamCtx<C, H, E>
where
    C: section::SectionCompressor + 'static,
    H: hash::RollingHash64,
    E: executor::JobExecutor + 'static,
{
    /// Destruction order per the orchestrator's lifecycle: quiesce and join
    /// every worker before any pool or job-table state is reclaimed, so no
    /// worker ever touches freed memory. The remaining steps (releasing
    /// pool buffers, freeing the job table, the two pools, the completion
    /// mutex/condvar, and the struct itself) follow automatically from
    /// Rust's ordinary field drop glue once this returns.
    fn drop(&mut self) {
        self.join_workers();
    }
}
