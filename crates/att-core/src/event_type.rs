//! Attendance event type enum as the single source of truth for event type strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of recorded attendance events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PunchIn,
    BreakStart,
    BreakEnd,
    PunchOut,
    /// Retroactive punch-out recorded when closing a stale session.
    LatePunchOut,
}

impl EventType {
    /// String representation for database storage and output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PunchIn => "PUNCH_IN",
            Self::BreakStart => "BREAK_START",
            Self::BreakEnd => "BREAK_END",
            Self::PunchOut => "PUNCH_OUT",
            Self::LatePunchOut => "LATE_PUNCH_OUT",
        }
    }

    /// Whether this event means the staff member is currently working.
    #[must_use]
    pub const fn is_working(&self) -> bool {
        matches!(self, Self::PunchIn | Self::BreakEnd)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUNCH_IN" => Ok(Self::PunchIn),
            "BREAK_START" => Ok(Self::BreakStart),
            "BREAK_END" => Ok(Self::BreakEnd),
            "PUNCH_OUT" => Ok(Self::PunchOut),
            "LATE_PUNCH_OUT" => Ok(Self::LatePunchOut),
            _ => Err(UnknownEventType(s.to_string())),
        }
    }
}

impl Serialize for EventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event type strings.
#[derive(Debug, Clone)]
pub struct UnknownEventType(String);

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type: {}", self.0)
    }
}

impl std::error::Error for UnknownEventType {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        let variants = [
            EventType::PunchIn,
            EventType::BreakStart,
            EventType::BreakEnd,
            EventType::PunchOut,
            EventType::LatePunchOut,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed: EventType = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn working_classification() {
        assert!(EventType::PunchIn.is_working());
        assert!(EventType::BreakEnd.is_working());
        assert!(!EventType::BreakStart.is_working());
        assert!(!EventType::PunchOut.is_working());
    }

    #[test]
    fn unknown_type_errors() {
        let err = "punch_in".parse::<EventType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown event type: punch_in");
    }
}
