//! ISO-8601 text forms shared by literal rendering and cursor decoding.
//!
//! Rendering writes `yyyy-MM-dd HH:mm:ss[.fff][+HH:MM]` (space separator, as
//! SQL literals use); parsing accepts both the space and `T` separators and
//! an optional trailing offset, since drivers hand back either form.

use core::fmt::Write;

use chrono::{FixedOffset, NaiveDateTime, NaiveTime, Timelike};

pub(crate) fn write_time(t: &NaiveTime, out: &mut String) {
    let _ = write!(out, "{}", t.format("%H:%M:%S"));
    write_fraction(t.nanosecond(), out);
}

pub(crate) fn write_datetime(dt: &NaiveDateTime, out: &mut String) {
    let _ = write!(out, "{}", dt.format("%Y-%m-%d %H:%M:%S"));
    write_fraction(dt.time().nanosecond(), out);
}

pub(crate) fn write_offset(offset: &FixedOffset, out: &mut String) {
    let _ = write!(out, "{offset}");
}

fn write_fraction(nanos: u32, out: &mut String) {
    // leap-second nanos (>= 1e9) are folded into the printed second
    let nanos = nanos % 1_000_000_000;
    if nanos == 0 {
        return;
    }
    let digits = format!("{nanos:09}");
    let trimmed = digits.trim_end_matches('0');
    out.push('.');
    out.push_str(trimmed);
}

/// Parses a timestamp in either `T` or space form, with an optional offset.
pub(crate) fn parse_datetime(s: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some((dt.naive_local(), Some(*dt.offset())));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(dt) = chrono::DateTime::parse_from_str(s, fmt) {
            return Some((dt.naive_local(), Some(*dt.offset())));
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some((dt, None));
        }
        if fmt == "%Y-%m-%d" {
            if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
                return Some((d.and_hms_opt(0, 0, 0)?, None));
            }
        }
    }
    None
}

/// Parses a time of day with an optional trailing offset.
pub(crate) fn parse_time(s: &str) -> Option<(NaiveTime, Option<FixedOffset>)> {
    let s = s.trim();
    // an offset sign can only appear after the HH:MM:SS prefix
    if let Some(at) = s[1..].find(['+', '-']).map(|i| i + 1) {
        let (time, offset) = s.split_at(at);
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S%.f").ok()?;
        let offset = parse_offset(offset)?;
        return Some((time, Some(offset)));
    }
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .ok()
        .map(|t| (t, None))
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1i32, &s[1..]),
        b'-' => (-1i32, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None if rest.len() == 4 => (
            rest[..2].parse::<i32>().ok()?,
            rest[2..].parse::<i32>().ok()?,
        ),
        None => (rest.parse::<i32>().ok()?, 0),
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn datetime_round_trips_both_separators() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        let mut text = String::new();
        write_datetime(&dt, &mut text);
        assert_eq!(text, "2024-03-09 14:30:05");
        assert_eq!(parse_datetime(&text), Some((dt, None)));
        assert_eq!(parse_datetime("2024-03-09T14:30:05"), Some((dt, None)));
    }

    #[test]
    fn fractions_are_trimmed() {
        let t = NaiveTime::from_hms_milli_opt(1, 2, 3, 450).unwrap();
        let mut text = String::new();
        write_time(&t, &mut text);
        assert_eq!(text, "01:02:03.45");
        assert_eq!(parse_time(&text), Some((t, None)));
    }

    #[test]
    fn offsets_are_recognized() {
        let (t, offset) = parse_time("12:00:00+02:00").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(offset, FixedOffset::east_opt(7200));
    }
}
