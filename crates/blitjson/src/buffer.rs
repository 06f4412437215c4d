//! The buffer manager: a fixed-capacity arena with explicit flush discipline.
//!
//! Output bytes accumulate at a position cursor and flush to the sink only
//! when a caller asks for more room than remains. The buffer is bound to one
//! sink for its whole lifetime; [`OutputBuffer::finish`] detaches the sink,
//! after which any flush fails with [`Error::StreamClosed`].

use std::io::{Read, Write};

use crate::{
    error::{Error, Result},
    pool::{BufferPool, Lease},
};

pub(crate) struct OutputBuffer<'p, W: Write> {
    buf: Lease<'p>,
    capacity: usize,
    pos: usize,
    sink: Option<W>,
}

impl<'p, W: Write> OutputBuffer<'p, W> {
    pub(crate) fn new(pool: &'p BufferPool, sink: W) -> Result<Self> {
        let capacity = pool.buffer_size();
        let buf = pool.acquire(capacity)?;
        Ok(Self {
            buf,
            capacity,
            pos: 0,
            sink: Some(sink),
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Flushes if fewer than `len` bytes remain.
    ///
    /// A request at or beyond the total capacity can never be satisfied by a
    /// single buffer load and fails with [`Error::ChunkTooLarge`]; such
    /// payloads must go through the large-value path instead.
    pub(crate) fn ensure_capacity(&mut self, len: usize) -> Result<()> {
        if len >= self.capacity {
            return Err(Error::ChunkTooLarge {
                requested: len,
                capacity: self.capacity,
            });
        }
        if self.pos + len < self.capacity {
            return Ok(());
        }
        self.flush()
    }

    /// Writes accumulated bytes to the sink and resets the position. No-op
    /// at position zero.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(Error::StreamClosed)?;
        if self.pos == 0 {
            return Ok(());
        }
        sink.write_all(&self.buf[..self.pos])?;
        self.pos = 0;
        Ok(())
    }

    /// Appends one byte. Capacity must already be ensured.
    #[inline]
    pub(crate) fn push(&mut self, b: u8) {
        debug_assert!(self.pos < self.capacity);
        self.buf[self.pos] = b;
        self.pos += 1;
    }

    /// Copies `bytes` at the current position. Capacity must already be
    /// ensured.
    #[inline]
    pub(crate) fn write_raw(&mut self, bytes: &[u8]) {
        debug_assert!(self.pos + bytes.len() <= self.capacity);
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    /// The large-value path: streams `bytes` through successive fill/flush
    /// cycles sized to the buffer capacity. The final chunk is left in the
    /// buffer, matching the fast path's flush behavior byte for byte.
    pub(crate) fn write_large(&mut self, bytes: &[u8]) -> Result<()> {
        let mut off = 0;
        while off < bytes.len() {
            let take = (bytes.len() - off).min(self.capacity);
            self.flush()?;
            self.buf[..take].copy_from_slice(&bytes[off..off + take]);
            self.pos = take;
            off += take;
        }
        Ok(())
    }

    /// Copies pre-existing bytes verbatim, flushing after every buffer load.
    pub(crate) fn copy_all_flushing(&mut self, bytes: &[u8]) -> Result<()> {
        self.flush()?;
        for chunk in bytes.chunks(self.capacity) {
            self.buf[..chunk.len()].copy_from_slice(chunk);
            self.pos = chunk.len();
            self.flush()?;
        }
        Ok(())
    }

    /// Drains `reader` through the buffer until end of stream.
    pub(crate) fn copy_reader<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.flush()?;
        loop {
            let n = reader.read(&mut self.buf[..self.capacity])?;
            if n == 0 {
                return Ok(());
            }
            self.pos = n;
            self.flush()?;
        }
    }

    /// Flushes remaining bytes and detaches the sink. Idempotent: calling it
    /// again is a silent no-op.
    pub(crate) fn finish(&mut self) -> Result<()> {
        if self.sink.is_none() {
            return Ok(());
        }
        self.flush()?;
        self.sink = None;
        Ok(())
    }

    /// Teardown flush for `Drop`: an already-closed sink does not escalate,
    /// and I/O failures have nowhere to go.
    pub(crate) fn teardown(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::OutputBuffer;
    use crate::{error::Error, pool::BufferPool};

    #[test]
    fn ensure_rejects_oversize_requests() {
        let pool = BufferPool::with_buffer_size(8);
        let mut out = OutputBuffer::new(&pool, Vec::new()).unwrap();
        assert!(matches!(
            out.ensure_capacity(8),
            Err(Error::ChunkTooLarge {
                requested: 8,
                capacity: 8
            })
        ));
        out.ensure_capacity(7).unwrap();
    }

    #[test]
    fn flush_is_noop_at_position_zero() {
        let pool = BufferPool::with_buffer_size(8);
        let mut out = OutputBuffer::new(&pool, Vec::new()).unwrap();
        out.flush().unwrap();
        out.flush().unwrap();
        assert_eq!(out.position(), 0);
    }

    #[test]
    fn flush_after_finish_reports_closed_stream() {
        let pool = BufferPool::with_buffer_size(8);
        let mut out = OutputBuffer::new(&pool, Vec::new()).unwrap();
        out.finish().unwrap();
        out.finish().unwrap();
        assert!(matches!(out.flush(), Err(Error::StreamClosed)));
    }

    #[test]
    fn large_write_leaves_tail_in_buffer() {
        let pool = BufferPool::with_buffer_size(4);
        let sink: Vec<u8> = Vec::new();
        let mut out = OutputBuffer::new(&pool, sink).unwrap();
        out.write_large(b"abcdefghij").unwrap();
        // 10 bytes through a 4-byte buffer: two full loads flushed, two left
        assert_eq!(out.position(), 2);
        out.finish().unwrap();
    }
}
