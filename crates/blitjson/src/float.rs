//! Floating values with pre-rendered decimal text and sentinel flags.
//!
//! The binary format never re-renders a double per write: the decimal text
//! is produced once when the value is built and copied verbatim afterwards.
//! NaN and the infinities carry no text at all; the writer emits their quoted
//! sentinel tokens instead.

/// Classification checked before the text is ever touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatClass {
    /// An ordinary finite double with pre-rendered text.
    Finite,
    /// Encoded as the quoted token `"NaN"`.
    Nan,
    /// Encoded as the quoted token `"Infinity"`.
    PositiveInfinity,
    /// Encoded as the quoted token `"-Infinity"`.
    NegativeInfinity,
}

/// A floating value as stored in the binary format.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    class: FloatClass,
    text: Box<str>,
}

impl FloatLiteral {
    /// Classifies `value` and renders finite values to decimal text once.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self {
                class: FloatClass::Nan,
                text: Box::from(""),
            };
        }
        if value == f64::INFINITY {
            return Self {
                class: FloatClass::PositiveInfinity,
                text: Box::from(""),
            };
        }
        if value == f64::NEG_INFINITY {
            return Self {
                class: FloatClass::NegativeInfinity,
                text: Box::from(""),
            };
        }
        let mut buf = ryu::Buffer::new();
        Self {
            class: FloatClass::Finite,
            text: Box::from(buf.format(value)),
        }
    }

    /// Wraps decimal text already rendered by the storage layer.
    #[must_use]
    pub fn from_decimal_text(text: impl Into<Box<str>>) -> Self {
        Self {
            class: FloatClass::Finite,
            text: text.into(),
        }
    }

    /// The sentinel classification.
    #[must_use]
    pub fn class(&self) -> FloatClass {
        self.class
    }

    /// Pre-rendered decimal text; empty for sentinel classes.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}
