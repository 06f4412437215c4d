//! Fixed-width date/time rendering.
//!
//! `yyyy-MM-ddTHH:mm:ss.fffffff`, seven fractional digits in 100 ns units,
//! with a trailing `Z` for UTC values. The output never contains escapable
//! bytes, so the writer emits it as a raw quoted string without consulting
//! the escape codec.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Longest rendered form: 27 characters plus the `Z` suffix.
pub(crate) const MAX_LEN: usize = 28;

/// Renders `value` into `buf`, returning the number of bytes written.
pub(crate) fn format_datetime(buf: &mut [u8; MAX_LEN], value: NaiveDateTime, is_utc: bool) -> usize {
    let date = value.date();
    let time = value.time();
    debug_assert!((0..=9999).contains(&date.year()), "year out of range");

    write_digits(&mut buf[0..4], date.year().unsigned_abs());
    buf[4] = b'-';
    write_digits(&mut buf[5..7], date.month());
    buf[7] = b'-';
    write_digits(&mut buf[8..10], date.day());
    buf[10] = b'T';
    write_digits(&mut buf[11..13], time.hour());
    buf[13] = b':';
    write_digits(&mut buf[14..16], time.minute());
    buf[16] = b':';
    write_digits(&mut buf[17..19], time.second());
    buf[19] = b'.';
    // 100 ns ticks; leap-second nanos wrap back into range
    write_digits(&mut buf[20..27], (time.nanosecond() % 1_000_000_000) / 100);
    if is_utc {
        buf[27] = b'Z';
        MAX_LEN
    } else {
        MAX_LEN - 1
    }
}

/// Zero-padded decimal rendering of `value` across the whole slice.
fn write_digits(slot: &mut [u8], value: u32) {
    let mut rest = value;
    for b in slot.iter_mut().rev() {
        *b = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{MAX_LEN, format_datetime};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, nanos: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_nano_opt(h, mi, s, nanos)
            .unwrap()
    }

    #[test]
    fn utc_form_is_fixed_width_with_suffix() {
        let mut buf = [0u8; MAX_LEN];
        let n = format_datetime(&mut buf, at(2024, 3, 7, 9, 5, 1, 123_456_700), true);
        assert_eq!(&buf[..n], b"2024-03-07T09:05:01.1234567Z");
    }

    #[test]
    fn local_form_drops_the_suffix() {
        let mut buf = [0u8; MAX_LEN];
        let n = format_datetime(&mut buf, at(1999, 12, 31, 23, 59, 59, 0), false);
        assert_eq!(&buf[..n], b"1999-12-31T23:59:59.0000000");
    }

    #[test]
    fn fraction_is_zero_padded_100ns_ticks() {
        let mut buf = [0u8; MAX_LEN];
        let n = format_datetime(&mut buf, at(2020, 1, 2, 3, 4, 5, 600), true);
        assert_eq!(&buf[..n], b"2020-01-02T03:04:05.0000006Z");
    }
}
