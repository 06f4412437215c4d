//! Little-endian base-128 variable-length integers.
//!
//! Seven data bits per byte, high bit set on every byte except the last,
//! least-significant group first. Trailer sizes in the binary format are
//! 32-bit quantities, so a well-formed varint is at most five bytes.

use crate::error::{Error, Result};

const MAX_BYTES: usize = 5;

/// Reads one varint starting at `*pos`, advancing `*pos` past it.
pub(crate) fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<usize> {
    let mut value = 0usize;
    let mut shift = 0u32;
    for _ in 0..MAX_BYTES {
        let b = *bytes
            .get(*pos)
            .ok_or(Error::CorruptTrailer("varint runs past end of buffer"))?;
        *pos += 1;
        value |= usize::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
    Err(Error::CorruptTrailer("varint longer than five bytes"))
}

/// Appends `value` in varint form. Used by document builders and tests.
pub(crate) fn write_varint(out: &mut Vec<u8>, mut value: usize) {
    loop {
        let mut b = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            b |= 0x80;
        }
        out.push(b);
        if value == 0 {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{read_varint, write_varint};
    use crate::error::Error;

    #[test]
    fn single_byte_values() {
        for v in [0usize, 1, 42, 127] {
            let mut buf = Vec::new();
            write_varint(&mut buf, v);
            assert_eq!(buf.len(), 1);
            let mut pos = 0;
            assert_eq!(read_varint(&buf, &mut pos).unwrap(), v);
            assert_eq!(pos, 1);
        }
    }

    #[test]
    fn multi_byte_roundtrip() {
        for v in [128usize, 300, 16_384, 1 << 20, u32::MAX as usize] {
            let mut buf = Vec::new();
            write_varint(&mut buf, v);
            let mut pos = 0;
            assert_eq!(read_varint(&buf, &mut pos).unwrap(), v);
            assert_eq!(pos, buf.len());
        }
    }

    #[test]
    fn little_endian_group_order() {
        // 300 = 0b100101100 -> groups 0101100, 0000010
        let mut buf = Vec::new();
        write_varint(&mut buf, 300);
        assert_eq!(buf, [0xac, 0x02]);
    }

    #[test]
    fn truncated_input_is_corrupt() {
        let mut pos = 0;
        let err = read_varint(&[0x80], &mut pos).unwrap_err();
        assert!(matches!(err, Error::CorruptTrailer(_)));
    }

    #[test]
    fn runaway_continuation_is_corrupt() {
        let mut pos = 0;
        let err = read_varint(&[0x80; 6], &mut pos).unwrap_err();
        assert!(matches!(err, Error::CorruptTrailer(_)));
    }
}
