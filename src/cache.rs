//! Reusable `String` buffers for leaf content.
//!
//! Each parse owns its cache (or borrows one injected by the caller);
//! it is never shared between concurrently running parses.

use crate::limits::{DEFAULT_STRING_CAPACITY, MAX_CACHED_STRINGS, MAX_CACHED_STRING_CAPACITY};

/// Pool of cleared `String` buffers.
#[derive(Debug, Default)]
pub struct StringCache {
    free: Vec<String>,
    initial_capacity: usize,
}

impl StringCache {
    pub fn new() -> Self {
        Self::with_initial_capacity(DEFAULT_STRING_CAPACITY)
    }

    /// Fresh buffers start out with `capacity` bytes reserved.
    pub fn with_initial_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::new(),
            initial_capacity: capacity,
        }
    }

    /// Take an empty buffer, reusing a released one when available.
    pub fn acquire(&mut self) -> String {
        self.free
            .pop()
            .unwrap_or_else(|| String::with_capacity(self.initial_capacity))
    }

    /// Return a buffer to the cache. It is cleared first; oversized
    /// buffers and buffers beyond the pool limit are dropped.
    pub fn release(&mut self, mut buf: String) {
        if self.free.len() >= MAX_CACHED_STRINGS || buf.capacity() > MAX_CACHED_STRING_CAPACITY {
            return;
        }
        buf.clear();
        self.free.push(buf);
    }

    /// Number of idle buffers.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}
