//! Bounded cache of section-compressor contexts.
//!
//! Mirrors `BufferPool` but without size matching: any cached context is
//! fungible. Seeded with one eagerly-created context at construction so a
//! single-thread fallback always has one available.

use std::sync::Mutex;

use crate::mtctx::section::SectionCompressor;

pub struct CCtxPool<C> {
    cache: Mutex<Vec<C>>,
    capacity: usize,
}

impl<C: SectionCompressor> CCtxPool<C> {
    pub fn new(nb_threads: usize) -> Self {
        let mut cache = Vec::new();
        if let Some(ctx) = C::create() {
            cache.push(ctx);
        }
        CCtxPool {
            cache: Mutex::new(cache),
            capacity: nb_threads.max(1),
        }
    }

    /// Returns a cached context if available, else attempts to create one
    /// (which may fail, yielding `None`).
    pub fn acquire(&self) -> Option<C> {
        let cached = {
            let mut g = self.cache.lock().unwrap();
            g.pop()
        };
        cached.or_else(C::create)
    }

    /// Caches up to capacity; contexts beyond that are dropped (freed).
    pub fn release(&self, mut ctx: C) {
        ctx.reset();
        let mut g = self.cache.lock().unwrap();
        if g.len() < self.capacity {
            g.push(ctx);
        }
    }
}
