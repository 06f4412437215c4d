//! Compact, self-describing, randomly-addressable binary document encoding
//! with a streaming encoder that renders document trees back into textual
//! JSON bytes.
//!
//! The binary format keeps string payloads exactly as stored — optionally
//! LZ4-compressed — alongside an escape trailer listing the bytes that need
//! `\x` expansion at write time. The [`TextWriter`] walks a document tree
//! depth first and emits JSON through a small pooled buffer with explicit
//! flush discipline, preserving both property-iteration orders an object
//! carries and the system's quoted `"NaN"` / `"Infinity"` / `"-Infinity"`
//! sentinels.
//!
//! # Examples
//!
//! ```
//! use blitjson::{BlitObject, BlitValue, BufferPool, LazyStrBuf, Property, TextWriter};
//!
//! let pool = BufferPool::new();
//! let obj = BlitObject::from_properties(vec![
//!     Property::new("id", BlitValue::Integer(7)),
//!     Property::new("name", BlitValue::String(LazyStrBuf::from_text("a/b"))),
//! ]);
//!
//! let mut out = Vec::new();
//! let mut writer = TextWriter::new(&pool, &mut out).unwrap();
//! writer.write_object(&obj).unwrap();
//! writer.finish().unwrap();
//! drop(writer);
//! assert_eq!(out, br#"{"id":7,"name":"a\/b"}"#);
//! ```

mod buffer;
mod datetime;
mod document;
mod error;
mod escape;
mod float;
mod lazy;
mod pool;
mod token;
mod varint;
mod writer;


pub use document::{BlitArray, BlitObject, BlitValue, Property};
pub use error::{Error, Result};
pub use float::{FloatClass, FloatLiteral};
pub use lazy::{EscapeIter, LazyCompressedBuf, LazyCompressedStr, LazyStr, LazyStrBuf};
pub use pool::{BufferPool, DEFAULT_BUFFER_SIZE, Lease};
pub use token::{TYPE_MASK, Token};
pub use writer::{
    FALSE_BUFFER, NAN_BUFFER, NEGATIVE_INFINITY_BUFFER, NULL_BUFFER, POSITIVE_INFINITY_BUFFER,
    TRUE_BUFFER, TextWriter,
};
