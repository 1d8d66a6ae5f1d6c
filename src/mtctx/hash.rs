//! 64-bit rolling hash contract backing the frame trailer checksum.
//!
//! The low 32 bits of the digest are written little-endian as the 4-byte
//! frame trailer, matching how `io::compress_mt` already derives its own
//! XXH32 content checksum externally rather than through the inner
//! compressor's per-frame checksum.

use xxhash_rust::xxh64::Xxh64;

/// Capability object for the external 64-bit streaming hash.
///
/// Modeled as a trait (rather than a concrete type used everywhere) so the
/// orchestrator core stays testable with a mock hash.
pub trait RollingHash64: Send {
    fn reset(&mut self, seed: u64);
    fn update(&mut self, data: &[u8]);
    fn digest(&self) -> u64;
}

/// Concrete backend: `xxhash_rust::xxh64::Xxh64`.
#[derive(Debug, Clone)]
pub struct Xxh64State(Xxh64);

impl Xxh64State {
    pub fn new(seed: u64) -> Self {
        Xxh64State(Xxh64::new(seed))
    }
}

impl Default for Xxh64State {
    fn default() -> Self {
        Xxh64State::new(0)
    }
}

impl RollingHash64 for Xxh64State {
    #[inline]
    fn reset(&mut self, seed: u64) {
        self.0.reset(seed);
    }

    #[inline]
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    #[inline]
    fn digest(&self) -> u64 {
        self.0.digest()
    }
}
