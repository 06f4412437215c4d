//! Error taxonomy for the binary document encoding and the text writer.
//!
//! Every failure is fatal to the current write operation: a caller observing
//! any of these mid-document must discard the whole output rather than try to
//! resume.

use thiserror::Error;

use crate::token::Token;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised while reading the binary document format or streaming it out
/// as JSON text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A raw token tag did not map to any of the nine known kinds.
    #[error("unknown token tag {0:#04x}")]
    UnknownToken(u8),

    /// An explicit token did not agree with the value node it accompanied.
    #[error("token {token:?} does not match value of kind {found:?}")]
    TokenMismatch {
        /// The token the caller passed in.
        token: Token,
        /// The kind of the value node that was actually supplied.
        found: Token,
    },

    /// A byte listed in an escape trailer is outside the escapable set.
    #[error("invalid escape byte {0:#04x} in escape trailer")]
    InvalidEscape(u8),

    /// The escape trailer of a lazy string is structurally broken.
    #[error("corrupt string trailer: {0}")]
    CorruptTrailer(&'static str),

    /// A write or flush was attempted after the sink was detached.
    #[error("write attempted after the sink was closed")]
    StreamClosed,

    /// A single bounded write was requested that can never fit the output
    /// buffer. Oversize payloads must go through the large-value path.
    #[error("chunk of {requested} bytes does not fit an output buffer of {capacity}")]
    ChunkTooLarge {
        /// Bytes the caller asked to reserve.
        requested: usize,
        /// Total capacity of the output buffer.
        capacity: usize,
    },

    /// The buffer pool refused to hand out another lease.
    #[error("buffer pool exhausted ({outstanding} leases outstanding)")]
    PoolExhausted {
        /// Leases alive at the time of the failed acquisition.
        outstanding: usize,
    },

    /// A compressed string payload failed to decompress.
    #[error("decompression failed: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    /// The sink reported an I/O failure during a flush.
    #[error("i/o error writing to sink: {0}")]
    Io(#[from] std::io::Error),
}
