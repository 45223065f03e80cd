//! Actions a scanner can request, and their validated parameters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{AttendanceError, Conflict};
use crate::types::SessionId;

/// An action a caller may ask the transition engine to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceAction {
    PunchIn,
    BreakStart,
    BreakEnd,
    PunchOut,
    /// Close a stale previous-day session and punch in for today.
    LatePunchOutAndPunchIn,
}

impl AttendanceAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PunchIn => "PUNCH_IN",
            Self::BreakStart => "BREAK_START",
            Self::BreakEnd => "BREAK_END",
            Self::PunchOut => "PUNCH_OUT",
            Self::LatePunchOutAndPunchIn => "LATE_PUNCH_OUT_AND_PUNCH_IN",
        }
    }
}

impl fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceAction {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PUNCH_IN" => Ok(Self::PunchIn),
            "BREAK_START" => Ok(Self::BreakStart),
            "BREAK_END" => Ok(Self::BreakEnd),
            "PUNCH_OUT" => Ok(Self::PunchOut),
            "LATE_PUNCH_OUT_AND_PUNCH_IN" => Ok(Self::LatePunchOutAndPunchIn),
            other => Err(Conflict::UnknownAction(other.to_string()).into()),
        }
    }
}

impl Serialize for AttendanceAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Raw, untyped action parameters as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParams {
    pub session_id: Option<String>,
    pub time: Option<String>,
    pub previous_session_id: Option<String>,
    pub approx_punch_out_time: Option<String>,
    pub reason: Option<String>,
    pub current_punch_in_time: Option<String>,
}

impl ActionParams {
    /// Parses parameters from a JSON object. `null` is treated as no parameters.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AttendanceError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value).map_err(|err| {
            Conflict::InvalidField {
                field: "actionParams",
                value: err.to_string(),
            }
            .into()
        })
    }
}

/// Parameters for closing a stale session and punching in again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LateClosure {
    pub previous_session_id: SessionId,
    pub approx_punch_out_time: DateTime<FixedOffset>,
    pub reason: Option<String>,
    pub current_punch_in_time: DateTime<FixedOffset>,
}

/// A fully validated action request.
///
/// `at` of `None` means "now" as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    PunchIn {
        at: Option<DateTime<FixedOffset>>,
    },
    BreakStart {
        session_id: SessionId,
        at: Option<DateTime<FixedOffset>>,
    },
    BreakEnd {
        session_id: SessionId,
        at: Option<DateTime<FixedOffset>>,
    },
    PunchOut {
        session_id: SessionId,
        at: Option<DateTime<FixedOffset>>,
    },
    LatePunchOutAndPunchIn(LateClosure),
}

impl ActionRequest {
    /// Validates raw parameters for the chosen action.
    pub fn from_params(
        action: AttendanceAction,
        params: &ActionParams,
    ) -> Result<Self, AttendanceError> {
        let at = optional_time("time", params.time.as_deref())?;
        let request = match action {
            AttendanceAction::PunchIn => Self::PunchIn { at },
            AttendanceAction::BreakStart => Self::BreakStart {
                session_id: required_session("sessionId", params.session_id.as_deref())?,
                at,
            },
            AttendanceAction::BreakEnd => Self::BreakEnd {
                session_id: required_session("sessionId", params.session_id.as_deref())?,
                at,
            },
            AttendanceAction::PunchOut => Self::PunchOut {
                session_id: required_session("sessionId", params.session_id.as_deref())?,
                at,
            },
            AttendanceAction::LatePunchOutAndPunchIn => {
                let previous_session_id =
                    required_session("previousSessionId", params.previous_session_id.as_deref())?;
                let approx_punch_out_time = optional_time(
                    "approxPunchOutTime",
                    params.approx_punch_out_time.as_deref(),
                )?
                .ok_or(Conflict::MissingField("approxPunchOutTime"))?;
                let current_punch_in_time = optional_time(
                    "currentPunchInTime",
                    params.current_punch_in_time.as_deref(),
                )?
                .ok_or(Conflict::MissingField("currentPunchInTime"))?;
                let reason = params
                    .reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string);
                Self::LatePunchOutAndPunchIn(LateClosure {
                    previous_session_id,
                    approx_punch_out_time,
                    reason,
                    current_punch_in_time,
                })
            }
        };
        Ok(request)
    }

    /// The action this request performs.
    #[must_use]
    pub const fn action(&self) -> AttendanceAction {
        match self {
            Self::PunchIn { .. } => AttendanceAction::PunchIn,
            Self::BreakStart { .. } => AttendanceAction::BreakStart,
            Self::BreakEnd { .. } => AttendanceAction::BreakEnd,
            Self::PunchOut { .. } => AttendanceAction::PunchOut,
            Self::LatePunchOutAndPunchIn(_) => AttendanceAction::LatePunchOutAndPunchIn,
        }
    }
}

fn required_session(field: &'static str, value: Option<&str>) -> Result<SessionId, Conflict> {
    let value = value.ok_or(Conflict::MissingField(field))?;
    SessionId::new(value).map_err(|_| Conflict::MissingField(field))
}

fn optional_time(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>, Conflict> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(Some)
            .map_err(|_| Conflict::InvalidField {
                field,
                value: raw.to_string(),
            }),
    }
}
