//! The streaming text encoder: renders a binary document tree as JSON bytes.
//!
//! The writer walks the tree depth first and pushes bytes through a pooled
//! fixed-capacity buffer, flushing to the sink whenever a write needs more
//! room than remains. Strings expand their escape trailers on the way out;
//! compressed strings decompress into transient pooled scratch first. One
//! writer serves one logical write operation against one sink and is neither
//! reentrant nor thread-safe; dropping it flushes whatever is left.
//!
//! Values whose rendered form is at or beyond the buffer capacity take the
//! large-value path, which streams through successive fill/flush cycles and
//! produces byte-identical output to the bounded fast path.

use std::io::{Read, Write};

use chrono::NaiveDateTime;

use crate::{
    buffer::OutputBuffer,
    datetime,
    document::{BlitArray, BlitObject, BlitValue},
    error::{Error, Result},
    escape::escape_char,
    float::{FloatClass, FloatLiteral},
    lazy::{EscapeIter, LazyCompressedStr, LazyStr, LazyStrBuf},
    pool::BufferPool,
    token::Token,
};

const START_OBJECT: u8 = b'{';
const END_OBJECT: u8 = b'}';
const START_ARRAY: u8 = b'[';
const END_ARRAY: u8 = b']';
const COMMA: u8 = b',';
const QUOTE: u8 = b'"';
const COLON: u8 = b':';

/// Quoted sentinel emitted for NaN doubles. Not a standard JSON number; the
/// system's own reader round-trips it.
pub static NAN_BUFFER: &[u8] = b"\"NaN\"";
/// Quoted sentinel emitted for positive infinity.
pub static POSITIVE_INFINITY_BUFFER: &[u8] = b"\"Infinity\"";
/// Quoted sentinel emitted for negative infinity.
pub static NEGATIVE_INFINITY_BUFFER: &[u8] = b"\"-Infinity\"";
/// The `null` literal.
pub static NULL_BUFFER: &[u8] = b"null";
/// The `true` literal.
pub static TRUE_BUFFER: &[u8] = b"true";
/// The `false` literal.
pub static FALSE_BUFFER: &[u8] = b"false";

/// Streaming JSON text writer over a binary document tree.
///
/// # Examples
///
/// ```
/// use blitjson::{BlitObject, BlitValue, BufferPool, Property, TextWriter};
///
/// let pool = BufferPool::new();
/// let obj = BlitObject::from_properties(vec![
///     Property::new("greeting", BlitValue::String(blitjson::LazyStrBuf::from_text("hi"))),
///     Property::new("count", BlitValue::Integer(2)),
/// ]);
///
/// let mut out = Vec::new();
/// let mut writer = TextWriter::new(&pool, &mut out).unwrap();
/// writer.write_object(&obj).unwrap();
/// writer.finish().unwrap();
/// drop(writer);
/// assert_eq!(out, br#"{"greeting":"hi","count":2}"#);
/// ```
pub struct TextWriter<'p, W: Write> {
    out: OutputBuffer<'p, W>,
    pool: &'p BufferPool,
}

impl<'p, W: Write> TextWriter<'p, W> {
    /// Binds a writer to `sink`, leasing its output buffer from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] when no output buffer is available.
    pub fn new(pool: &'p BufferPool, sink: W) -> Result<Self> {
        Ok(Self {
            out: OutputBuffer::new(pool, sink)?,
            pool,
        })
    }

    /// Bytes accumulated in the buffer since the last flush.
    #[must_use]
    pub fn position(&self) -> usize {
        self.out.position()
    }

    /// Writes `obj` iterating properties in physical storage order.
    ///
    /// # Errors
    ///
    /// Fails with any [`Error`]; the output must then be discarded.
    pub fn write_object(&mut self, obj: &BlitObject) -> Result<()> {
        self.write_start_object()?;
        for (i, prop) in obj.properties().iter().enumerate() {
            if i != 0 {
                self.write_comma()?;
            }
            self.write_property_name(prop.name.as_lazy())?;
            self.write_value(prop.token(), &prop.value, false)?;
        }
        self.write_end_object()
    }

    /// Writes `obj` iterating properties in their original insertion order.
    ///
    /// # Errors
    ///
    /// Fails with any [`Error`]; the output must then be discarded.
    pub fn write_object_ordered(&mut self, obj: &BlitObject) -> Result<()> {
        self.write_start_object()?;
        for (i, prop) in obj.properties_in_insertion_order().enumerate() {
            if i != 0 {
                self.write_comma()?;
            }
            self.write_property_name(prop.name.as_lazy())?;
            self.write_value(prop.token(), &prop.value, true)?;
        }
        self.write_end_object()
    }

    fn write_array(&mut self, array: &BlitArray, use_insertion_order: bool) -> Result<()> {
        self.write_start_array()?;
        for (i, item) in array.items().iter().enumerate() {
            if i != 0 {
                self.write_comma()?;
            }
            self.write_value(item.token(), item, use_insertion_order)?;
        }
        self.write_end_array()
    }

    /// Dispatches one value by its token. Nested objects and arrays inherit
    /// `use_insertion_order` from the invoking context.
    ///
    /// # Errors
    ///
    /// [`Error::TokenMismatch`] when `token` disagrees with the value node,
    /// otherwise any [`Error`] from the value's own encoding.
    pub fn write_value(
        &mut self,
        token: Token,
        value: &BlitValue,
        use_insertion_order: bool,
    ) -> Result<()> {
        if token != value.token() {
            return Err(Error::TokenMismatch {
                token,
                found: value.token(),
            });
        }
        match value {
            BlitValue::String(s) => self.write_string(s.as_lazy()),
            BlitValue::CompressedString(s) => self.write_compressed_string(s.as_lazy()),
            BlitValue::Integer(v) => self.write_integer(*v),
            BlitValue::Float(lit) => self.write_float_literal(lit),
            BlitValue::Boolean(v) => self.write_bool(*v),
            BlitValue::Null => self.write_null(),
            BlitValue::Array(a) => self.write_array(a, use_insertion_order),
            BlitValue::Object(o) | BlitValue::Embedded(o) => {
                if use_insertion_order {
                    self.write_object_ordered(o)
                } else {
                    self.write_object(o)
                }
            }
        }
    }

    /// Writes a lazy string as a quoted, escaped JSON string.
    ///
    /// # Errors
    ///
    /// [`Error::CorruptTrailer`] or [`Error::InvalidEscape`] on a broken
    /// trailer, plus any flush failure.
    pub fn write_string(&mut self, s: LazyStr<'_>) -> Result<()> {
        let (escape_count, escapes) = s.escape_trailer()?;
        self.write_lazy_quoted(s.payload(), escape_count, escapes)
    }

    /// Decompresses a compressed lazy string into pooled scratch and writes
    /// it like a plain one. The scratch lease is released on every exit
    /// path, including decode failure.
    ///
    /// # Errors
    ///
    /// [`Error::Decompress`] and [`Error::PoolExhausted`] on top of the
    /// plain-string failure modes.
    pub fn write_compressed_string(&mut self, s: LazyCompressedStr<'_>) -> Result<()> {
        let mut scratch = self.pool.acquire(s.uncompressed_size())?;
        s.decompress_into(&mut scratch)?;
        let (escape_count, escapes) = s.escape_trailer()?;
        let payload = &scratch[..s.uncompressed_size()];
        self.write_lazy_quoted(payload, escape_count, escapes)
    }

    /// Convenience: builds a lazy string from `text` and writes it.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        let lazy = LazyStrBuf::from_text(text);
        self.write_string(lazy.as_lazy())
    }

    fn write_lazy_quoted(
        &mut self,
        payload: &[u8],
        escape_count: usize,
        escapes: EscapeIter<'_>,
    ) -> Result<()> {
        let needed = 2 * escape_count + payload.len() + 2;
        if needed >= self.out.capacity() {
            return self.write_large_quoted(payload, escapes);
        }
        self.out.ensure_capacity(needed)?;
        self.out.push(QUOTE);
        if escape_count == 0 {
            // fast path: the trailer guarantees nothing needs escaping
            self.out.write_raw(payload);
        } else {
            let mut rest = payload;
            for skip in escapes {
                let (run, tail) = split_run(rest, skip?)?;
                self.out.write_raw(run);
                self.out.push(b'\\');
                self.out.push(escape_char(tail[0])?);
                rest = &tail[1..];
            }
            self.out.write_raw(rest);
        }
        self.out.push(QUOTE);
        Ok(())
    }

    fn write_large_quoted(&mut self, payload: &[u8], escapes: EscapeIter<'_>) -> Result<()> {
        self.out.ensure_capacity(1)?;
        self.out.push(QUOTE);
        let mut rest = payload;
        for skip in escapes {
            let (run, tail) = split_run(rest, skip?)?;
            self.write_raw_auto(run)?;
            self.out.ensure_capacity(2)?;
            self.out.push(b'\\');
            self.out.push(escape_char(tail[0])?);
            rest = &tail[1..];
        }
        self.write_raw_auto(rest)?;
        self.out.ensure_capacity(1)?;
        self.out.push(QUOTE);
        Ok(())
    }

    /// Bounded copy when the payload fits one buffer load, the large-value
    /// path otherwise.
    fn write_raw_auto(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() < self.out.capacity() {
            self.out.ensure_capacity(bytes.len())?;
            self.out.write_raw(bytes);
            return Ok(());
        }
        self.out.write_large(bytes)
    }

    /// Writes a quoted string whose payload is guaranteed to contain no
    /// escapable bytes, bypassing the escape codec.
    ///
    /// # Errors
    ///
    /// [`Error::ChunkTooLarge`] if the payload cannot fit one buffer load,
    /// plus any flush failure.
    pub fn write_raw_quoted(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.ensure_capacity(bytes.len() + 2)?;
        self.out.push(QUOTE);
        self.out.write_raw(bytes);
        self.out.push(QUOTE);
        Ok(())
    }

    /// Writes a property name followed by a colon.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`TextWriter::write_string`].
    pub fn write_property_name(&mut self, name: LazyStr<'_>) -> Result<()> {
        self.write_string(name)?;
        self.out.ensure_capacity(1)?;
        self.out.push(COLON);
        Ok(())
    }

    /// Convenience: property name from plain text.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_property_name_text(&mut self, name: &str) -> Result<()> {
        let lazy = LazyStrBuf::from_text(name);
        self.write_property_name(lazy.as_lazy())
    }

    /// Writes a signed 64-bit integer in decimal.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_integer(&mut self, value: i64) -> Result<()> {
        if value == 0 {
            self.out.ensure_capacity(1)?;
            self.out.push(b'0');
            return Ok(());
        }

        let mut scratch = [0u8; 20];
        let mut idx = 0;
        let negative = value < 0;
        // i64::MIN has no positive counterpart; go through i64::MAX and add
        // the missing unit back on the first division step.
        let mut is_min = false;
        let mut val = value;
        if negative {
            if val == i64::MIN {
                is_min = true;
                val = i64::MAX;
            } else {
                val = -val;
            }
        }

        loop {
            let mut digit = val % 10;
            if is_min {
                is_min = false;
                digit += 1;
            }
            scratch[idx] = b'0' + digit as u8;
            idx += 1;
            val /= 10;
            if val == 0 {
                break;
            }
        }
        if negative {
            scratch[idx] = b'-';
            idx += 1;
        }

        self.out.ensure_capacity(idx)?;
        while idx > 0 {
            idx -= 1;
            self.out.push(scratch[idx]);
        }
        Ok(())
    }

    /// Writes a stored floating literal: sentinel classes emit their quoted
    /// tokens, finite values copy the pre-rendered text verbatim.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_float_literal(&mut self, lit: &FloatLiteral) -> Result<()> {
        match lit.class() {
            FloatClass::Nan => self.write_sentinel(NAN_BUFFER),
            FloatClass::PositiveInfinity => self.write_sentinel(POSITIVE_INFINITY_BUFFER),
            FloatClass::NegativeInfinity => self.write_sentinel(NEGATIVE_INFINITY_BUFFER),
            FloatClass::Finite => self.write_raw_auto(lit.text().as_bytes()),
        }
    }

    /// Writes a double, rendering finite values on the spot.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_double(&mut self, value: f64) -> Result<()> {
        if value.is_nan() {
            return self.write_sentinel(NAN_BUFFER);
        }
        if value == f64::INFINITY {
            return self.write_sentinel(POSITIVE_INFINITY_BUFFER);
        }
        if value == f64::NEG_INFINITY {
            return self.write_sentinel(NEGATIVE_INFINITY_BUFFER);
        }
        let mut buf = ryu::Buffer::new();
        self.write_raw_auto(buf.format(value).as_bytes())
    }

    fn write_sentinel(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.ensure_capacity(bytes.len())?;
        self.out.write_raw(bytes);
        Ok(())
    }

    /// Writes `true` or `false`.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_sentinel(if value { TRUE_BUFFER } else { FALSE_BUFFER })
    }

    /// Writes `null`.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_null(&mut self) -> Result<()> {
        self.write_sentinel(NULL_BUFFER)
    }

    /// Writes a date/time as a raw quoted fixed-width string.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_datetime(&mut self, value: NaiveDateTime, is_utc: bool) -> Result<()> {
        let mut buf = [0u8; datetime::MAX_LEN];
        let len = datetime::format_datetime(&mut buf, value, is_utc);
        self.write_raw_quoted(&buf[..len])
    }

    /// Writes `{`.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_start_object(&mut self) -> Result<()> {
        self.write_byte(START_OBJECT)
    }

    /// Writes `}`.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_end_object(&mut self) -> Result<()> {
        self.write_byte(END_OBJECT)
    }

    /// Writes `[`.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_start_array(&mut self) -> Result<()> {
        self.write_byte(START_ARRAY)
    }

    /// Writes `]`.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_end_array(&mut self) -> Result<()> {
        self.write_byte(END_ARRAY)
    }

    /// Writes a separating comma.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_comma(&mut self) -> Result<()> {
        self.write_byte(COMMA)
    }

    /// Writes a CRLF pair.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_newline(&mut self) -> Result<()> {
        self.out.ensure_capacity(2)?;
        self.out.push(b'\r');
        self.out.push(b'\n');
        Ok(())
    }

    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.out.ensure_capacity(1)?;
        self.out.push(b);
        Ok(())
    }

    /// Drains `reader` straight to the sink through the buffer, bypassing
    /// the document model.
    ///
    /// # Errors
    ///
    /// Any read or flush failure.
    pub fn write_stream<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.out.copy_reader(reader)
    }

    /// Copies pre-existing bytes verbatim, flushing after every buffer load.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn write_memory_chunk(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.copy_all_flushing(bytes)
    }

    /// Flushes accumulated bytes to the sink.
    ///
    /// # Errors
    ///
    /// [`Error::StreamClosed`] after [`TextWriter::finish`], or the sink's
    /// I/O error.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()
    }

    /// Flushes and detaches the sink. A second call is a silent no-op.
    ///
    /// # Errors
    ///
    /// Any flush failure.
    pub fn finish(&mut self) -> Result<()> {
        self.out.finish()
    }
}

impl<W: Write> Drop for TextWriter<'_, W> {
    fn drop(&mut self) {
        self.out.teardown();
    }
}

fn split_run(rest: &[u8], skip: usize) -> Result<(&[u8], &[u8])> {
    if skip >= rest.len() {
        return Err(Error::CorruptTrailer("skip distance past end of payload"));
    }
    Ok(rest.split_at(skip))
}
