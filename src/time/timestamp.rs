//! Compact MITgcm timestamps (`YYYYMMDDTHHMMSS`).

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Length of a compact timestamp without the optional `Z` suffix.
pub const COMPACT_LEN: usize = 15;

/// Error raised for a timestamp that does not follow the compact layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFormatError {
    /// Wrong number of characters
    #[error("timestamp {input:?} has length {len}, expected 15 (YYYYMMDDTHHMMSS)")]
    Length { input: String, len: usize },

    /// A fixed-width numeric field contains something other than ASCII digits
    #[error("timestamp {input:?}: {field} field {value:?} is not numeric")]
    NonDigit {
        input: String,
        field: &'static str,
        value: String,
    },

    /// Missing `T` between date and time
    #[error("timestamp {input:?}: expected 'T' separator at position 8")]
    Separator { input: String },

    /// All fields numeric but not a real calendar instant
    #[error("timestamp {input:?} is not a valid date/time")]
    OutOfRange { input: String },

    /// End of a range lies before its start, or the step is not positive
    #[error("invalid time range: {0}")]
    Range(String),
}

/// Parse a compact timestamp such as `20121009T180000`.
///
/// A single trailing `Z` is tolerated. Anything else that does not match the
/// fixed-width layout is rejected.
///
/// # Example
/// ```
/// use llc_steric::time::parse_time;
///
/// let t = parse_time("20121009T180000").unwrap();
/// assert_eq!(t.to_string(), "2012-10-09 18:00:00");
/// ```
pub fn parse_time(ts: &str) -> Result<NaiveDateTime, TimeFormatError> {
    if !ts.is_ascii() {
        return Err(TimeFormatError::NonDigit {
            input: ts.to_string(),
            field: "timestamp",
            value: ts.to_string(),
        });
    }

    let body = match ts.len() {
        COMPACT_LEN => ts,
        16 if ts.ends_with('Z') => &ts[..COMPACT_LEN],
        len => {
            return Err(TimeFormatError::Length {
                input: ts.to_string(),
                len,
            });
        }
    };

    if body.as_bytes()[8] != b'T' {
        return Err(TimeFormatError::Separator {
            input: ts.to_string(),
        });
    }

    let field = |name: &'static str, range: std::ops::Range<usize>| -> Result<u32, TimeFormatError> {
        let value = &body[range];
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeFormatError::NonDigit {
                input: ts.to_string(),
                field: name,
                value: value.to_string(),
            });
        }
        // All-digit fields of at most four characters always fit in u32
        Ok(value.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0')))
    };

    let year = field("year", 0..4)?;
    let month = field("month", 4..6)?;
    let day = field("day", 6..8)?;
    let hour = field("hour", 9..11)?;
    let minute = field("minute", 11..13)?;
    let second = field("second", 13..15)?;

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| TimeFormatError::OutOfRange {
            input: ts.to_string(),
        })
}

/// Render a timestamp in the compact layout accepted by [`parse_time`].
pub fn format_time(t: &NaiveDateTime) -> String {
    t.format("%Y%m%dT%H%M%S").to_string()
}
