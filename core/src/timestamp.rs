//! Timestamp normalization.
//!
//! Event timestamps arrive in three encodings:
//!   - unix seconds   (number or digit-only string, below 1e12)
//!   - unix millis    (number or digit-only string, 1e12 and above)
//!   - ISO-8601 text  (RFC 3339, naive date-time, or a bare date; naive values are UTC)
//!
//! Everything downstream of ingestion works on `EpochMillis` only.
//! An unparsable value normalizes to `None`; it never errors.

use crate::types::EpochMillis;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Values below this are interpreted as unix seconds.
const SECONDS_CUTOFF: f64 = 1e12;

/// A timestamp as received from the platform, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Number(f64),
    Text(String),
}

impl RawTimestamp {
    pub fn normalize(&self) -> Option<EpochMillis> {
        match self {
            RawTimestamp::Number(n) => from_unix_number(*n),
            RawTimestamp::Text(s) => parse_text(s),
        }
    }
}

impl From<i64> for RawTimestamp {
    fn from(n: i64) -> Self {
        RawTimestamp::Number(n as f64)
    }
}

impl From<&str> for RawTimestamp {
    fn from(s: &str) -> Self {
        RawTimestamp::Text(s.to_string())
    }
}

impl From<String> for RawTimestamp {
    fn from(s: String) -> Self {
        RawTimestamp::Text(s)
    }
}

fn from_unix_number(n: f64) -> Option<EpochMillis> {
    if !n.is_finite() {
        return None;
    }
    let millis = if n < SECONDS_CUTOFF { n * 1000.0 } else { n };
    // Out-of-range magnitudes cannot be represented as epoch millis.
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    Some(millis.round() as EpochMillis)
}

fn parse_text(raw: &str) -> Option<EpochMillis> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<f64>().ok().and_then(from_unix_number);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MILLIS: EpochMillis = 1_700_000_000_000;

    #[test]
    fn seconds_and_millis_agree() {
        assert_eq!(RawTimestamp::Number(1_700_000_000.0).normalize(), Some(MILLIS));
        assert_eq!(RawTimestamp::Number(MILLIS as f64).normalize(), Some(MILLIS));
    }

    #[test]
    fn digit_strings_are_unix_values() {
        assert_eq!(RawTimestamp::from("1700000000").normalize(), Some(MILLIS));
        assert_eq!(RawTimestamp::from("1700000000000").normalize(), Some(MILLIS));
    }

    #[test]
    fn iso_encodings_parse() {
        assert_eq!(
            RawTimestamp::from("2023-11-14T22:13:20+00:00").normalize(),
            Some(MILLIS)
        );
        assert_eq!(RawTimestamp::from("2023-11-14T22:13:20Z").normalize(), Some(MILLIS));
        assert_eq!(RawTimestamp::from("2023-11-14T22:13:20").normalize(), Some(MILLIS));
        assert_eq!(
            RawTimestamp::from("2023-11-14").normalize(),
            Some(MILLIS - (22 * 3600 + 13 * 60 + 20) * 1000)
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(RawTimestamp::from("").normalize(), None);
        assert_eq!(RawTimestamp::from("yesterday").normalize(), None);
        assert_eq!(RawTimestamp::Number(f64::NAN).normalize(), None);
    }

    #[test]
    fn deserializes_untagged() {
        let n: RawTimestamp = serde_json::from_str("1700000000").unwrap();
        let s: RawTimestamp = serde_json::from_str("\"2023-11-14T22:13:20Z\"").unwrap();
        assert_eq!(n.normalize(), s.normalize());
    }
}
