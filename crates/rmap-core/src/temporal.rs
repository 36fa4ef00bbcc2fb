//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines [`Timestamp`], the instant type used for event start/end times
//! and as the key of version maps.
//!
//! ## Precision
//!
//! Timestamps are truncated to milliseconds. Version maps are keyed by
//! timestamp, so two instants that render identically must compare equal;
//! a nanosecond component that survives in memory but not in a serialized
//! snapshot would break that.
//!
//! ## Formats
//!
//! - ISO 8601 with `Z` suffix: `2026-01-15T12:00:00.000Z` (storage, logs, JSON).
//! - HTTP-date (RFC 1123): `Thu, 15 Jan 2026 12:00:00 GMT`, the format of
//!   Memento `Accept-Datetime` / `Memento-Datetime` headers.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC timestamp with millisecond precision.
///
/// Deserialization truncates through [`Timestamp::from_utc`], so a snapshot
/// carrying sub-millisecond digits loads onto the same keys the engine
/// would have produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// From a `chrono::DateTime<Utc>`, truncating below milliseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp {
                value: s.to_string(),
                reason: "must use Z suffix (UTC only)".to_string(),
            });
        }
        Self::parse_lenient(s)
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| ValidationError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Parse an HTTP-date (`Thu, 15 Jan 2026 12:00:00 GMT`).
    pub fn parse_http_date(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc2822(s).map_err(|e| ValidationError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Parse either an RFC 3339 string or an HTTP-date.
    pub fn parse_any(s: &str) -> Result<Self, ValidationError> {
        Self::parse_lenient(s).or_else(|_| Self::parse_http_date(s))
    }

    /// From milliseconds since the Unix epoch.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, ValidationError> {
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTimestamp {
                value: millis.to_string(),
                reason: "out of range".to_string(),
            })
    }

    /// Milliseconds since the Unix epoch.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// This instant shifted by `millis` (negative to go back), or `None`
    /// on overflow.
    pub fn checked_add_millis(&self, millis: i64) -> Option<Self> {
        self.0
            .checked_add_signed(Duration::milliseconds(millis))
            .map(Self)
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// ISO 8601 with milliseconds and `Z` suffix.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    /// RFC 1123 HTTP-date. Sub-second precision is dropped.
    pub fn to_http_date(&self) -> String {
        self.0.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn now_has_millisecond_precision() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn from_utc_truncates_below_millis() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45.123Z");
    }

    #[test]
    fn strict_parse_requires_z() {
        assert!(Timestamp::parse("2026-01-15T12:00:00Z").is_ok());
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn lenient_parse_converts_offsets() {
        let ts = Timestamp::parse_lenient("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00.000Z");
    }

    #[test]
    fn http_date_round_trip_at_second_precision() {
        let ts = Timestamp::parse_http_date("Thu, 15 Jan 2026 12:00:00 GMT").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00.000Z");
        assert_eq!(ts.to_http_date(), "Thu, 15 Jan 2026 12:00:00 GMT");
    }

    #[test]
    fn parse_any_accepts_both_formats() {
        let a = Timestamp::parse_any("2026-01-15T12:00:00Z").unwrap();
        let b = Timestamp::parse_any("Thu, 15 Jan 2026 12:00:00 GMT").unwrap();
        assert_eq!(a, b);
        assert!(Timestamp::parse_any("yesterday").is_err());
    }

    #[test]
    fn epoch_millis_round_trip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00.250Z").unwrap();
        let back = Timestamp::from_epoch_millis(ts.epoch_millis()).unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn checked_add_moves_both_directions() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let before = ts.checked_add_millis(-1).unwrap();
        let after = ts.checked_add_millis(1).unwrap();
        assert!(before < ts && ts < after);
        assert_eq!(after.epoch_millis() - before.epoch_millis(), 2);
    }

    #[test]
    fn serde_round_trip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00.007Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn deserialize_truncates_below_millis() {
        let parsed: Timestamp = serde_json::from_str("\"2026-01-15T12:00:00.000500Z\"").unwrap();
        assert_eq!(parsed, Timestamp::parse("2026-01-15T12:00:00Z").unwrap());
        assert_eq!(parsed.as_datetime().timestamp_subsec_nanos(), 0);
    }
}
