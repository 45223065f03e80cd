//! Derives a staff member's current attendance state.
//!
//! Resolution is a pure read: it only looks at the staff member's OPEN
//! session (if any) and the latest event recorded against it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::action::AttendanceAction;
use crate::event_type::EventType;
use crate::session::AttendanceSession;
use crate::types::SessionId;

/// The four attendance phases a scan can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceState {
    NoSessionToday,
    Working {
        session_id: SessionId,
    },
    OnBreak {
        session_id: SessionId,
    },
    /// An OPEN session from an earlier day was never closed.
    PreviousSessionOpen {
        session_id: SessionId,
        date: NaiveDate,
    },
}

impl AttendanceState {
    /// Wire name of the state.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NoSessionToday => "NO_SESSION_TODAY",
            Self::Working { .. } => "WORKING",
            Self::OnBreak { .. } => "ON_BREAK",
            Self::PreviousSessionOpen { .. } => "PREVIOUS_SESSION_OPEN",
        }
    }

    /// Actions a caller may offer from this state.
    #[must_use]
    pub const fn allowed_actions(&self) -> &'static [AttendanceAction] {
        match self {
            Self::NoSessionToday => &[AttendanceAction::PunchIn],
            Self::Working { .. } => &[AttendanceAction::BreakStart, AttendanceAction::PunchOut],
            Self::OnBreak { .. } => &[AttendanceAction::BreakEnd],
            Self::PreviousSessionOpen { .. } => &[AttendanceAction::LatePunchOutAndPunchIn],
        }
    }

    /// Session the state refers to, if any.
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::NoSessionToday => None,
            Self::Working { session_id }
            | Self::OnBreak { session_id }
            | Self::PreviousSessionOpen { session_id, .. } => Some(session_id),
        }
    }
}

impl Serialize for AttendanceState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

/// Data inconsistencies noticed while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionAnomaly {
    /// The OPEN session has no events at all.
    OpenSessionWithoutEvents,
    /// The OPEN session's latest event already closed it.
    OpenSessionAlreadyClosed(EventType),
}

impl ResolutionAnomaly {
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::OpenSessionWithoutEvents => "open session has no recorded events",
            Self::OpenSessionAlreadyClosed(_) => "open session ends with a punch-out event",
        }
    }
}

/// Result of resolving attendance state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub state: AttendanceState,
    pub anomaly: Option<ResolutionAnomaly>,
}

impl Resolution {
    const fn clean(state: AttendanceState) -> Self {
        Self {
            state,
            anomaly: None,
        }
    }
}

/// Resolve the state from the OPEN session and its latest event type.
///
/// `today` is the reference-zone day of the scan instant. Anomalous sessions
/// resolve as [`AttendanceState::NoSessionToday`] and are reported alongside.
pub fn resolve_state(
    open_session: Option<&AttendanceSession>,
    latest_event: Option<EventType>,
    today: NaiveDate,
) -> Resolution {
    let Some(session) = open_session else {
        return Resolution::clean(AttendanceState::NoSessionToday);
    };

    if session.date < today {
        return Resolution::clean(AttendanceState::PreviousSessionOpen {
            session_id: session.id.clone(),
            date: session.date,
        });
    }

    let session_id = session.id.clone();
    match latest_event {
        None => {
            tracing::warn!(session_id = %session.id, "open session has no events");
            Resolution {
                state: AttendanceState::NoSessionToday,
                anomaly: Some(ResolutionAnomaly::OpenSessionWithoutEvents),
            }
        }
        Some(EventType::BreakStart) => Resolution::clean(AttendanceState::OnBreak { session_id }),
        Some(EventType::PunchIn | EventType::BreakEnd) => {
            Resolution::clean(AttendanceState::Working { session_id })
        }
        Some(kind @ (EventType::PunchOut | EventType::LatePunchOut)) => {
            tracing::warn!(session_id = %session.id, event = %kind, "open session already punched out");
            Resolution {
                state: AttendanceState::NoSessionToday,
                anomaly: Some(ResolutionAnomaly::OpenSessionAlreadyClosed(kind)),
            }
        }
    }
}
