//! The lazy string model: byte-range views into the binary buffer.
//!
//! A lazy string keeps its payload exactly as it sits in the document buffer
//! and defers all escaping to write time. The payload is followed by a
//! trailer `[escape-count: varint][escape-count × skip-distance: varint]`
//! listing how many verbatim bytes to copy before each byte that needs
//! escaping. A count of zero guarantees the payload contains no escapable
//! bytes at all, which is what makes the writer's single-copy fast path
//! sound.
//!
//! Compressed lazy strings carry an LZ4 block in place of the payload; the
//! trailer keeps the same format and describes the *decompressed* bytes.

use bstr::BStr;

use crate::{
    error::{Error, Result},
    escape::needs_escape,
    varint::{read_varint, write_varint},
};

/// Borrowed view of a plain lazy string.
///
/// `bytes[..len]` is the payload; the escape trailer starts at `len`.
#[derive(Clone, Copy)]
pub struct LazyStr<'a> {
    bytes: &'a [u8],
    len: usize,
}

impl<'a> LazyStr<'a> {
    /// Wraps a raw byte range. `len` is the payload length; the trailer must
    /// follow at that offset.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds `bytes.len()`.
    #[must_use]
    pub fn new(bytes: &'a [u8], len: usize) -> Self {
        assert!(len <= bytes.len(), "payload length exceeds backing range");
        Self { bytes, len }
    }

    /// The raw payload, exactly as stored.
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[..self.len]
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Parses the trailer header, yielding the escape count and an iterator
    /// over the skip distances.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptTrailer`] when the trailer varints are
    /// truncated or overlong.
    pub fn escape_trailer(&self) -> Result<(usize, EscapeIter<'a>)> {
        EscapeIter::parse(self.bytes, self.len)
    }
}

impl core::fmt::Debug for LazyStr<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazyStr")
            .field("payload", &BStr::new(self.payload()))
            .finish_non_exhaustive()
    }
}

/// Iterator over the skip distances of an escape trailer.
///
/// Yields `Err` when a varint in the skip list is malformed; a well-formed
/// trailer yields exactly `escape_count` distances.
#[derive(Clone)]
pub struct EscapeIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    remaining: usize,
}

impl<'a> EscapeIter<'a> {
    fn parse(bytes: &'a [u8], trailer_start: usize) -> Result<(usize, Self)> {
        let mut pos = trailer_start;
        let count = read_varint(bytes, &mut pos)?;
        Ok((
            count,
            Self {
                bytes,
                pos,
                remaining: count,
            },
        ))
    }
}

impl Iterator for EscapeIter<'_> {
    type Item = Result<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(read_varint(self.bytes, &mut self.pos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Owned lazy string, built from plain text or raw storage bytes.
///
/// This is the form the document model holds; [`LazyStrBuf::as_lazy`] gives
/// the borrowed view the writer consumes.
#[derive(Clone)]
pub struct LazyStrBuf {
    bytes: Vec<u8>,
    len: usize,
}

impl LazyStrBuf {
    /// Builds a lazy string from text, scanning for escapable bytes and
    /// laying out the payload followed by the trailer.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let payload = text.as_bytes();
        let skips = scan_skips(payload);
        let mut bytes = Vec::with_capacity(payload.len() + 1 + skips.len());
        bytes.extend_from_slice(payload);
        append_trailer(&mut bytes, &skips);
        Self {
            bytes,
            len: payload.len(),
        }
    }

    /// Wraps bytes already laid out as `[payload][trailer]` by the storage
    /// layer.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds `bytes.len()`.
    #[must_use]
    pub fn from_raw_parts(bytes: Vec<u8>, len: usize) -> Self {
        assert!(len <= bytes.len(), "payload length exceeds backing range");
        Self { bytes, len }
    }

    /// Borrowed view for the writer.
    #[must_use]
    pub fn as_lazy(&self) -> LazyStr<'_> {
        LazyStr {
            bytes: &self.bytes,
            len: self.len,
        }
    }
}

impl core::fmt::Debug for LazyStrBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_lazy().fmt(f)
    }
}

/// Borrowed view of a compressed lazy string.
///
/// `bytes[..compressed_size]` is the LZ4 block; the escape trailer for the
/// decompressed payload starts at `compressed_size`.
#[derive(Clone, Copy)]
pub struct LazyCompressedStr<'a> {
    bytes: &'a [u8],
    compressed_size: usize,
    uncompressed_size: usize,
}

impl<'a> LazyCompressedStr<'a> {
    /// Wraps a raw compressed range with its explicit sizes.
    ///
    /// # Panics
    ///
    /// Panics if `compressed_size` exceeds `bytes.len()`.
    #[must_use]
    pub fn new(bytes: &'a [u8], compressed_size: usize, uncompressed_size: usize) -> Self {
        assert!(
            compressed_size <= bytes.len(),
            "compressed region exceeds backing range"
        );
        Self {
            bytes,
            compressed_size,
            uncompressed_size,
        }
    }

    /// The LZ4 block.
    #[must_use]
    pub fn compressed_payload(&self) -> &'a [u8] {
        &self.bytes[..self.compressed_size]
    }

    /// Size of the LZ4 block in bytes.
    #[must_use]
    pub fn compressed_size(&self) -> usize {
        self.compressed_size
    }

    /// Length of the payload once decompressed.
    #[must_use]
    pub fn uncompressed_size(&self) -> usize {
        self.uncompressed_size
    }

    /// Parses the trailer that follows the compressed region. The skip
    /// distances refer to the decompressed payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptTrailer`] when the trailer varints are
    /// truncated or overlong.
    pub fn escape_trailer(&self) -> Result<(usize, EscapeIter<'a>)> {
        EscapeIter::parse(self.bytes, self.compressed_size)
    }

    /// Decompresses the payload into `scratch`, which must be at least
    /// `uncompressed_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decompress`] when the block is malformed and
    /// [`Error::CorruptTrailer`] when the decompressed length disagrees with
    /// the recorded `uncompressed_size`.
    pub fn decompress_into(&self, scratch: &mut [u8]) -> Result<()> {
        let dst = &mut scratch[..self.uncompressed_size];
        let written = lz4_flex::block::decompress_into(self.compressed_payload(), dst)?;
        if written != self.uncompressed_size {
            return Err(Error::CorruptTrailer("uncompressed size mismatch"));
        }
        Ok(())
    }
}

impl core::fmt::Debug for LazyCompressedStr<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazyCompressedStr")
            .field("compressed_size", &self.compressed_size)
            .field("uncompressed_size", &self.uncompressed_size)
            .finish_non_exhaustive()
    }
}

/// Owned compressed lazy string.
#[derive(Clone)]
pub struct LazyCompressedBuf {
    bytes: Vec<u8>,
    compressed_size: usize,
    uncompressed_size: usize,
}

impl LazyCompressedBuf {
    /// Compresses `text` into an LZ4 block and appends the escape trailer of
    /// the plain payload.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let payload = text.as_bytes();
        let mut bytes = lz4_flex::block::compress(payload);
        let compressed_size = bytes.len();
        append_trailer(&mut bytes, &scan_skips(payload));
        Self {
            bytes,
            compressed_size,
            uncompressed_size: payload.len(),
        }
    }

    /// Wraps bytes already laid out as `[lz4 block][trailer]` by the storage
    /// layer.
    ///
    /// # Panics
    ///
    /// Panics if `compressed_size` exceeds `bytes.len()`.
    #[must_use]
    pub fn from_raw_parts(bytes: Vec<u8>, compressed_size: usize, uncompressed_size: usize) -> Self {
        assert!(
            compressed_size <= bytes.len(),
            "compressed region exceeds backing range"
        );
        Self {
            bytes,
            compressed_size,
            uncompressed_size,
        }
    }

    /// Borrowed view for the writer.
    #[must_use]
    pub fn as_lazy(&self) -> LazyCompressedStr<'_> {
        LazyCompressedStr {
            bytes: &self.bytes,
            compressed_size: self.compressed_size,
            uncompressed_size: self.uncompressed_size,
        }
    }
}

impl core::fmt::Debug for LazyCompressedBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_lazy().fmt(f)
    }
}

/// Skip distances for every escapable byte in `payload`, measured from the
/// end of the previous escape.
fn scan_skips(payload: &[u8]) -> Vec<usize> {
    let mut skips = Vec::new();
    let mut run_start = 0usize;
    for (i, &b) in payload.iter().enumerate() {
        if needs_escape(b) {
            skips.push(i - run_start);
            run_start = i + 1;
        }
    }
    skips
}

fn append_trailer(out: &mut Vec<u8>, skips: &[usize]) {
    write_varint(out, skips.len());
    for &skip in skips {
        write_varint(out, skip);
    }
}

#[cfg(test)]
mod tests {
    use super::{LazyCompressedBuf, LazyStrBuf};

    fn skips(s: &LazyStrBuf) -> Vec<usize> {
        let (count, iter) = s.as_lazy().escape_trailer().unwrap();
        let collected: Vec<_> = iter.map(Result::unwrap).collect();
        assert_eq!(collected.len(), count);
        collected
    }

    #[test]
    fn clean_text_has_empty_trailer() {
        let s = LazyStrBuf::from_text("hello world");
        assert_eq!(s.as_lazy().payload(), b"hello world");
        assert_eq!(skips(&s), Vec::<usize>::new());
    }

    #[test]
    fn skip_distances_measure_verbatim_runs() {
        // escapes at offsets 2 and 6: runs of 2 and 3 verbatim bytes
        let s = LazyStrBuf::from_text("ab\ncde\"f");
        assert_eq!(skips(&s), vec![2, 3]);
    }

    #[test]
    fn adjacent_escapes_have_zero_skips() {
        let s = LazyStrBuf::from_text("\\\\");
        assert_eq!(skips(&s), vec![0, 0]);
    }

    #[test]
    fn leading_escape_has_zero_skip() {
        let s = LazyStrBuf::from_text("\tx");
        assert_eq!(skips(&s), vec![0]);
    }

    #[test]
    fn compressed_roundtrips_through_scratch() {
        let text = "line one\nline two\nline two\nline two\n";
        let c = LazyCompressedBuf::from_text(text);
        let view = c.as_lazy();
        assert_eq!(view.uncompressed_size(), text.len());
        let mut scratch = vec![0u8; view.uncompressed_size()];
        view.decompress_into(&mut scratch).unwrap();
        assert_eq!(&scratch, text.as_bytes());
    }

    #[test]
    fn compressed_trailer_matches_plain_trailer() {
        let text = "a\"b\"c\nd";
        let plain = LazyStrBuf::from_text(text);
        let compressed = LazyCompressedBuf::from_text(text);
        let (plain_count, plain_iter) = plain.as_lazy().escape_trailer().unwrap();
        let (comp_count, comp_iter) = compressed.as_lazy().escape_trailer().unwrap();
        assert_eq!(plain_count, comp_count);
        let a: Vec<_> = plain_iter.map(Result::unwrap).collect();
        let b: Vec<_> = comp_iter.map(Result::unwrap).collect();
        assert_eq!(a, b);
    }
}
