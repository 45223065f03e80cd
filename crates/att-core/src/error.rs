//! Rejection taxonomy for attendance requests.
//!
//! Every failure is a rejected request with a precise cause. Nothing here is
//! fatal, and a rejected request leaves all state unchanged.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Kinds of records a lookup can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Organization,
    System,
    Staff,
    Session,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Organization => "organization",
            Self::System => "system identity",
            Self::Staff => "staff",
            Self::Session => "session",
        })
    }
}

/// Why a caller or staff member is not allowed to proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("role {role:?} is not permitted to record attendance")]
    RoleNotPermitted { role: String },
    #[error("system identity is not bound to this organization")]
    SystemOrgMismatch,
    #[error("staff member belongs to another organization")]
    StaffOrgMismatch,
    #[error("badge is deactivated")]
    BadgeDeactivated,
}

/// Why an action is not legal right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("previous day session still open (dated {date}); close it with LATE_PUNCH_OUT_AND_PUNCH_IN")]
    PreviousSessionOpen { date: NaiveDate },
    #[error("already punched in")]
    AlreadyPunchedIn,
    #[error("attendance for {date} is already closed")]
    DayAlreadyClosed { date: NaiveDate },
    #[error("session is not open")]
    SessionClosed,
    #[error("not currently working")]
    NotWorking,
    #[error("not currently on a break")]
    NotOnBreak,
    #[error("session dated {date} is not from a previous day")]
    SessionNotStale { date: NaiveDate },
    #[error("time precedes the last recorded event")]
    TimeBeforeLastEvent,
    #[error("punch-in time precedes the late punch-out time")]
    PunchInBeforePunchOut,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("an employee code or email is required")]
    NoEmployeeIdentifier,
}

/// A rejected attendance request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    /// The organization, system identity, staff member or session does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// The caller or staff member is not allowed to proceed.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] Denial),

    /// The action is not legal for the current attendance state.
    #[error("invalid state: {0}")]
    InvalidState(#[from] Conflict),
}

impl AttendanceError {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Category name used in structured failure output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::Unauthorized(_) => "Unauthorized",
            Self::InvalidState(_) => "InvalidState",
        }
    }
}
