//! The escape codec: mapping between raw bytes and textual `\x` sequences.
//!
//! The binary format does not store escaped text. Instead a string's trailer
//! lists the positions of bytes that need escaping, and the writer expands
//! them on the way out. The escapable set is closed: backspace, tab, newline,
//! form feed, carriage return, backslash, forward slash and double quote.

use crate::error::{Error, Result};

const INVALID: u8 = 0xff;

/// Built once at startup; maps each byte to the character following `\` in
/// its textual escape, or [`INVALID`] for bytes outside the escapable set.
static ESCAPE_TABLE: [u8; 256] = build_escape_table();

const fn build_escape_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    table[0x08] = b'b';
    table[b'\t' as usize] = b't';
    table[b'\n' as usize] = b'n';
    table[0x0c] = b'f';
    table[b'\r' as usize] = b'r';
    table[b'\\' as usize] = b'\\';
    table[b'/' as usize] = b'/';
    table[b'"' as usize] = b'"';
    table
}

/// Maps a byte skipped by an escape trailer to the character written after
/// the backslash.
///
/// # Errors
///
/// Returns [`Error::InvalidEscape`] for bytes outside the escapable set; a
/// trailer naming such a byte is corrupt.
#[inline]
pub(crate) fn escape_char(b: u8) -> Result<u8> {
    match ESCAPE_TABLE[b as usize] {
        INVALID => Err(Error::InvalidEscape(b)),
        c => Ok(c),
    }
}

/// Whether `b` must be recorded in the escape trailer when building a lazy
/// string from plain text.
#[inline]
pub(crate) fn needs_escape(b: u8) -> bool {
    ESCAPE_TABLE[b as usize] != INVALID
}

#[cfg(test)]
mod tests {
    use super::{escape_char, needs_escape};
    use crate::error::Error;

    #[test]
    fn maps_the_full_escapable_set() {
        let expected = [
            (0x08u8, b'b'),
            (b'\t', b't'),
            (b'\n', b'n'),
            (0x0c, b'f'),
            (b'\r', b'r'),
            (b'\\', b'\\'),
            (b'/', b'/'),
            (b'"', b'"'),
        ];
        for (raw, mapped) in expected {
            assert!(needs_escape(raw));
            assert_eq!(escape_char(raw).unwrap(), mapped);
        }
    }

    #[test]
    fn rejects_everything_else() {
        let escapable = [0x08u8, b'\t', b'\n', 0x0c, b'\r', b'\\', b'/', b'"'];
        for b in 0u8..=255 {
            if escapable.contains(&b) {
                continue;
            }
            assert!(!needs_escape(b));
            assert!(matches!(escape_char(b), Err(Error::InvalidEscape(x)) if x == b));
        }
    }
}
