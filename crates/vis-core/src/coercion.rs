//! Best-effort conversion of raw field text into numbers and timestamps.
//!
//! The lossy helpers are the single place where malformed input is turned
//! into zero (numbers) or [`RecordDate::Invalid`] (dates). Such fallbacks
//! silently skew aggregates, so [`CoercionPolicy::Strict`] exists to surface
//! them as errors instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VisError};
use crate::models::{Field, RecordDate};

/// What to do when a field does not coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionPolicy {
    /// Substitute zero / the invalid-date marker and keep going.
    #[default]
    Lossy,
    /// Fail the run with [`VisError::Coercion`].
    Strict,
}

// ── Numbers ───────────────────────────────────────────────────────────────────

/// Parse the leading number of `raw` as a finite `f64`.
///
/// Leading whitespace is skipped and anything after the longest numeric
/// prefix is ignored, so `"500c"` reads as `500` and `"2 pcs"` as `2`.
/// Returns `None` when no digits start the value.
pub fn parse_number(raw: &str) -> Option<f64> {
    let prefix = numeric_prefix(raw.trim_start());
    if prefix.is_empty() {
        return None;
    }
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest `[+-]digits[.digits][(e|E)[+-]digits]` prefix of `s`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &s[..end]
}

/// Lossy numeric coercion: absent input, input with no leading number and
/// non-finite values all become `0.0`.
pub fn coerce_number_or_zero(raw: Option<&str>) -> f64 {
    raw.and_then(parse_number).unwrap_or(0.0)
}

/// Coerce `raw` according to `policy`.
///
/// `line` and `field` only feed the error message.
pub fn coerce_number(
    raw: Option<&str>,
    policy: CoercionPolicy,
    line: usize,
    field: Field,
) -> Result<f64> {
    match (raw.and_then(parse_number), policy) {
        (Some(v), _) => Ok(v),
        (None, CoercionPolicy::Lossy) => Ok(0.0),
        (None, CoercionPolicy::Strict) => Err(VisError::Coercion {
            line,
            field: field.header_name(),
            value: raw.unwrap_or_default().to_string(),
        }),
    }
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Minute-precision ISO forms carrying a zone, which RFC 3339 requires seconds
/// for.
const ZONED_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a `dateTime` value into UTC.
///
/// Tries RFC 3339 (any offset is converted to UTC), minute-precision ISO with
/// an offset or `Z`, RFC 2822, then a set of offset-less patterns which are
/// read as UTC wall-clock time.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ZONED_DATE_TIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    if let Some(naive) = s.strip_suffix('Z') {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M") {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// Coerce a `dateTime` value according to `policy`.
pub fn coerce_date(raw: Option<&str>, policy: CoercionPolicy, line: usize) -> Result<RecordDate> {
    match (raw.and_then(parse_date_time), policy) {
        (Some(ts), _) => Ok(RecordDate::Valid(ts)),
        (None, CoercionPolicy::Lossy) => Ok(RecordDate::Invalid),
        (None, CoercionPolicy::Strict) => Err(VisError::Coercion {
            line,
            field: Field::DateTime.header_name(),
            value: raw.unwrap_or_default().to_string(),
        }),
    }
}
