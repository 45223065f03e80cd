//! Calendar-day normalization against a fixed reference timezone.
//!
//! Sessions are keyed by the calendar day of their punch-in, measured in one
//! fixed UTC offset regardless of the offset the scanner reported.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// The fixed offset that defines calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone {
    offset: FixedOffset,
}

impl ReferenceZone {
    /// Creates a reference zone from a fixed offset.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// UTC as the reference zone.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Returns the underlying offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The calendar day an instant falls on in this zone.
    pub fn day_of<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.offset.local_minus_utc();
        let sign = if total < 0 { '-' } else { '+' };
        let minutes = total.unsigned_abs() / 60;
        write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

impl FromStr for ReferenceZone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidOffset {
            value: s.to_string(),
        };
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };
        if !rest.is_ascii() {
            return Err(invalid());
        }
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 => rest.split_at(2),
            None => (rest, "0"),
        };
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::new)
            .ok_or_else(invalid)
    }
}

impl Serialize for ReferenceZone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ReferenceZone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(s: &str) -> ReferenceZone {
        s.parse().expect("valid offset")
    }

    #[test]
    fn parses_common_offset_forms() {
        assert_eq!(zone("+05:30").offset().local_minus_utc(), 19_800);
        assert_eq!(zone("-0800").offset().local_minus_utc(), -28_800);
        assert_eq!(zone("+02").offset().local_minus_utc(), 7_200);
        assert_eq!(zone("Z"), ReferenceZone::utc());
        assert!("05:30".parse::<ReferenceZone>().is_err());
        assert!("+25:00".parse::<ReferenceZone>().is_err());
    }

    #[test]
    fn non_ascii_offset_is_rejected() {
        assert_eq!(
            "+aé1".parse::<ReferenceZone>(),
            Err(ValidationError::InvalidOffset {
                value: "+aé1".to_string()
            })
        );
        assert!("+０５:30".parse::<ReferenceZone>().is_err());
    }

    #[test]
    fn display_roundtrips() {
        assert_eq!(zone("+05:30").to_string(), "+05:30");
        assert_eq!(zone("-03:00").to_string(), "-03:00");
        assert_eq!(ReferenceZone::utc().to_string(), "+00:00");
    }

    #[test]
    fn day_follows_reference_zone_not_input_offset() {
        let instant = DateTime::parse_from_rfc3339("2025-03-10T20:00:00-05:00").unwrap();
        // 2025-03-11T01:00Z
        assert_eq!(
            ReferenceZone::utc().day_of(&instant),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );
        assert_eq!(
            zone("-05:00").day_of(&instant),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
    }
}
