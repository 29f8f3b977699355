//! Zoned date-time value

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::ValueError;

/// Canonical text format, e.g. `1991-12-21T12:21:19.000+0000`
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// An instant together with the UTC offset it was expressed in
///
/// Unlike `chrono::DateTime`, equality also compares the offset: the same
/// instant seen from two zones is two different states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTimeType(DateTime<FixedOffset>);

impl DateTimeType {
    pub fn new(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }

    /// Current time in the given offset
    pub fn now(offset: FixedOffset) -> Self {
        Self(Utc::now().with_timezone(&offset))
    }

    /// Parse ISO-8601 text, using `default_offset` when the text has no zone
    pub fn parse_with_offset(s: &str, default_offset: FixedOffset) -> Result<Self, ValueError> {
        let s = s.trim();
        let invalid = || ValueError::InvalidDateTime {
            input: s.to_string(),
        };

        if let Ok(zoned) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(zoned));
        }
        for format in ZONED_FORMATS {
            if let Ok(zoned) = DateTime::parse_from_str(s, format) {
                return Ok(Self(zoned));
            }
        }

        let local = LOCAL_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(invalid)?;

        local
            .and_local_timezone(default_offset)
            .single()
            .map(Self)
            .ok_or_else(invalid)
    }

    /// The value with its original offset
    pub fn zoned(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// The same instant in UTC
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    pub fn offset(&self) -> FixedOffset {
        *self.0.offset()
    }
}

impl PartialEq for DateTimeType {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.offset() == other.offset()
    }
}

impl Eq for DateTimeType {}

impl Hash for DateTimeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
        self.offset().local_minus_utc().hash(state);
    }
}

impl From<DateTime<FixedOffset>> for DateTimeType {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }
}

impl From<DateTime<Utc>> for DateTimeType {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.with_timezone(&utc_offset()))
    }
}

impl FromStr for DateTimeType {
    type Err = ValueError;

    /// Zone-less text is interpreted as UTC
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_offset(s, utc_offset())
    }
}

impl fmt::Display for DateTimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_TIME_FORMAT))
    }
}

/// The zero UTC offset
pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_parse_local_text_uses_default_offset() {
        let value: DateTimeType = "1991-12-21T12:21:19".parse().unwrap();
        assert_eq!(value.offset(), utc_offset());
        assert_eq!(value.zoned().year(), 1991);
        assert_eq!(value.zoned().hour(), 12);
        assert_eq!(value.to_string(), "1991-12-21T12:21:19.000+0000");

        let cet = FixedOffset::east_opt(3600).unwrap();
        let value = DateTimeType::parse_with_offset("1991-12-21T12:21:19", cet).unwrap();
        assert_eq!(value.offset(), cet);
        assert_eq!(value.to_utc().hour(), 11);
    }

    #[test]
    fn test_parse_zoned_text() {
        let value: DateTimeType = "1991-12-21T12:21:19+02:00".parse().unwrap();
        assert_eq!(value.offset().local_minus_utc(), 7200);

        let value: DateTimeType = "1991-12-21T12:21:19.000+0200".parse().unwrap();
        assert_eq!(value.offset().local_minus_utc(), 7200);

        let value: DateTimeType = "1991-12-21".parse().unwrap();
        assert_eq!(value.zoned().minute(), 0);
    }

    #[test]
    fn test_display_roundtrip() {
        let value: DateTimeType = "2020-02-29T23:59:58.250-0500".parse().unwrap();
        let reparsed: DateTimeType = value.to_string().parse().unwrap();
        assert_eq!(value, reparsed);
    }

    #[test]
    fn test_equality_compares_offset() {
        let utc = DateTimeType::from(Utc.with_ymd_and_hms(1991, 12, 21, 12, 21, 19).unwrap());
        let shifted = DateTimeType::new(utc.zoned().with_timezone(&FixedOffset::east_opt(3600).unwrap()));
        assert_eq!(utc.to_utc(), shifted.to_utc());
        assert_ne!(utc, shifted);
    }

    #[test]
    fn test_invalid_text() {
        assert!(matches!(
            "yesterday".parse::<DateTimeType>().unwrap_err(),
            ValueError::InvalidDateTime { .. }
        ));
    }
}
