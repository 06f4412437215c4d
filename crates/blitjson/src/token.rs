//! The closed token tag identifying every value node in the binary format.

use crate::error::{Error, Result};

/// Mask separating the token tag from positional flag bits in a raw header
/// byte. The high bits carry offset/property-id width flags that are only
/// meaningful to the storage layer.
pub const TYPE_MASK: u8 = 0x0f;

/// Kind of a value node in the binary document format.
///
/// Exactly one token accompanies every value. The nine kinds are a closed
/// set; all dispatch over them is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Token {
    /// Nested object whose properties follow inline.
    StartObject = 0x01,
    /// Nested array whose items follow inline.
    StartArray = 0x02,
    /// Signed 64-bit integer.
    Integer = 0x03,
    /// Floating value with pre-rendered decimal text and sentinel flags.
    FloatLiteral = 0x04,
    /// Plain lazy string: payload plus escape trailer.
    String = 0x05,
    /// LZ4-compressed lazy string.
    CompressedString = 0x06,
    /// Boolean literal.
    Boolean = 0x07,
    /// Null literal.
    Null = 0x08,
    /// A complete pre-encoded document stored as a value.
    EmbeddedDocument = 0x09,
}

impl Token {
    /// Decodes a raw header byte, ignoring positional flag bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownToken`] when the masked tag is not one of the
    /// nine kinds.
    pub fn from_raw(raw: u8) -> Result<Self> {
        match raw & TYPE_MASK {
            0x01 => Ok(Self::StartObject),
            0x02 => Ok(Self::StartArray),
            0x03 => Ok(Self::Integer),
            0x04 => Ok(Self::FloatLiteral),
            0x05 => Ok(Self::String),
            0x06 => Ok(Self::CompressedString),
            0x07 => Ok(Self::Boolean),
            0x08 => Ok(Self::Null),
            0x09 => Ok(Self::EmbeddedDocument),
            _ => Err(Error::UnknownToken(raw)),
        }
    }

    /// The raw tag for this token, with no flag bits set.
    #[must_use]
    pub fn as_raw(self) -> u8 {
        self as u8
    }
}
