//! Bounded cache of scratch buffers shared by workers and the orchestrator.
//!
//! Grounded on the same "lock only around the pop/push, allocate unlocked"
//! shape `threadpool::TPool` already uses for its own pending counter.

use std::sync::Mutex;

/// An owned scratch buffer. The "null buffer" of the source design becomes
/// `Option<PooledBuffer>` at call sites that need an explicit absent marker.
#[derive(Debug)]
pub struct PooledBuffer(pub Vec<u8>);

impl PooledBuffer {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct Inner {
    target_size: usize,
    cache: Vec<Vec<u8>>,
}

/// Capacity `2*T + 3`: up to `T` worker `src`, up to `T` worker `dst`, plus
/// 3 orchestrator-held buffers (current input staging, next input staging,
/// one in-flight swap).
pub struct BufferPool {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl BufferPool {
    pub fn new(nb_threads: usize, target_size: usize) -> Self {
        BufferPool {
            inner: Mutex::new(Inner {
                target_size,
                cache: Vec::new(),
            }),
            capacity: 2 * nb_threads.max(1) + 3,
        }
    }

    /// Updates the target size under the pool lock; affects only subsequent acquires.
    pub fn set_target_size(&self, size: usize) {
        self.inner.lock().unwrap().target_size = size;
    }

    pub fn target_size(&self) -> usize {
        self.inner.lock().unwrap().target_size
    }

    /// Pop the newest cached buffer; accept it iff its size is in `[S, 8S]`,
    /// else free it and allocate fresh of size `S`. Returns `None` (the null
    /// buffer) on allocation failure, never as an error.
    pub fn acquire(&self) -> Option<PooledBuffer> {
        let target_size = {
            let mut g = self.inner.lock().unwrap();
            let target_size = g.target_size;
            if let Some(buf) = g.cache.pop() {
                let s = buf.capacity();
                if s >= target_size && s / 8 <= target_size {
                    return Some(PooledBuffer(buf));
                }
                // buf is dropped here (freed) and we fall through to a fresh allocation.
            }
            target_size
        };

        let mut v = Vec::new();
        v.try_reserve_exact(target_size).ok()?;
        v.resize(target_size, 0);
        Some(PooledBuffer(v))
    }

    /// Null releases are no-ops; otherwise cache up to capacity, else free.
    pub fn release(&self, buf: Option<PooledBuffer>) {
        let Some(PooledBuffer(v)) = buf else {
            return;
        };
        let mut g = self.inner.lock().unwrap();
        if g.cache.len() < self.capacity {
            g.cache.push(v);
        }
    }

    /// Locked snapshot of total bytes retained by cached buffers, for
    /// introspection between compressions.
    pub fn sizeof(&self) -> usize {
        let g = self.inner.lock().unwrap();
        g.cache.iter().map(|b| b.capacity()).sum::<usize>() + core::mem::size_of::<Self>()
    }
}
