//! Attendance sessions and the immutable events recorded against them.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aggregate::DurationEvent;
use crate::event_type::EventType;
use crate::types::{EventId, OrgId, SessionId, StaffId};

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Open,
    Closed,
}

impl SessionStatus {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(format!("invalid session status: {s}")),
        }
    }
}

/// How a session was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosureType {
    /// Closed by a same-day punch-out.
    Normal,
    /// Closed retroactively through the late-closure flow.
    Late,
}

impl ClosureType {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Late => "LATE",
        }
    }
}

impl std::fmt::Display for ClosureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClosureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(Self::Normal),
            "LATE" => Ok(Self::Late),
            _ => Err(format!("invalid closure type: {s}")),
        }
    }
}

/// One staff member's attendance for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    pub id: SessionId,
    pub org_id: OrgId,
    pub staff_id: StaffId,
    /// Calendar day in the reference zone.
    pub date: NaiveDate,
    pub status: SessionStatus,
    pub closure_type: Option<ClosureType>,
    pub first_punch_in_at: DateTime<FixedOffset>,
    pub last_punch_out_at: Option<DateTime<FixedOffset>>,
    pub total_work_seconds: i64,
    pub total_break_seconds: i64,
    pub is_late_closure: bool,
    pub late_punch_out_reason: Option<String>,
    pub late_punch_out_recorded_at: Option<DateTime<FixedOffset>>,
}

impl AttendanceSession {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

/// An immutable, timestamped attendance occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    pub id: EventId,
    pub org_id: OrgId,
    pub staff_id: StaffId,
    pub session_id: SessionId,
    pub event_type: EventType,
    /// When the event happened, in the offset the caller supplied.
    pub timestamp: DateTime<FixedOffset>,
    /// Capture channel, e.g. `QR`.
    pub source: String,
    pub is_correction: bool,
    pub correction_note: Option<String>,
}

impl DurationEvent for AttendanceEvent {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    fn event_type(&self) -> EventType {
        self.event_type
    }
}
