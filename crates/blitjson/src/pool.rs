//! Pooled byte buffers for output and decompression scratch.
//!
//! The pool is single-threaded by design; the encoder model is one writer
//! per logical write operation with no internal concurrency, so a `RefCell`
//! free list is all the coordination needed. Buffers come back automatically
//! when a [`Lease`] drops, which is what guarantees release on every exit
//! path, including decode failure.

use core::cell::{Cell, RefCell};

use crate::error::{Error, Result};

/// Default capacity of the writer's output buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

const DEFAULT_MAX_OUTSTANDING: usize = 64;

/// Allocator handing out reusable byte buffers.
///
/// A writer acquires one output buffer for its whole lifetime and,
/// transiently, one scratch buffer per compressed-string value.
pub struct BufferPool {
    buffer_size: usize,
    max_outstanding: usize,
    outstanding: Cell<usize>,
    free: RefCell<Vec<Vec<u8>>>,
}

impl BufferPool {
    /// Pool with the default output-buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Pool whose output buffers hold `buffer_size` bytes. Small sizes are
    /// useful in tests to force flushes and the large-value path.
    ///
    /// # Panics
    ///
    /// Panics if `buffer_size` is zero.
    #[must_use]
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        assert!(buffer_size > 0, "buffer size must be non-zero");
        Self {
            buffer_size,
            max_outstanding: DEFAULT_MAX_OUTSTANDING,
            outstanding: Cell::new(0),
            free: RefCell::new(Vec::new()),
        }
    }

    /// Capacity of output buffers handed to writers.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Leases a buffer of at least `min_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] once the cap on outstanding leases is
    /// reached.
    pub fn acquire(&self, min_size: usize) -> Result<Lease<'_>> {
        let outstanding = self.outstanding.get();
        if outstanding >= self.max_outstanding {
            return Err(Error::PoolExhausted { outstanding });
        }
        let mut buf = self.free.borrow_mut().pop().unwrap_or_default();
        if buf.len() < min_size {
            buf.resize(min_size, 0);
        }
        self.outstanding.set(outstanding + 1);
        Ok(Lease { pool: self, buf })
    }

    fn release(&self, buf: Vec<u8>) {
        self.outstanding.set(self.outstanding.get() - 1);
        self.free.borrow_mut().push(buf);
    }

    #[cfg(test)]
    fn outstanding(&self) -> usize {
        self.outstanding.get()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped lease of a pooled buffer; returns to the pool on drop.
pub struct Lease<'p> {
    pool: &'p BufferPool,
    buf: Vec<u8>,
}

impl core::ops::Deref for Lease<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl core::ops::DerefMut for Lease<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.pool.release(core::mem::take(&mut self.buf));
    }
}
