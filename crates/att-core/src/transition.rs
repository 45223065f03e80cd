//! Precondition rules for attendance transitions.
//!
//! ```text
//! [no session] --PUNCH_IN--> OPEN/WORKING
//! OPEN/WORKING --BREAK_START--> OPEN/ON_BREAK
//! OPEN/ON_BREAK --BREAK_END--> OPEN/WORKING
//! OPEN/WORKING|ON_BREAK --PUNCH_OUT--> CLOSED(NORMAL)
//! OPEN(previous day) --LATE_PUNCH_OUT--> CLOSED(LATE), then --PUNCH_IN--> new OPEN/WORKING
//! ```
//!
//! These checks are pure. The storage layer runs them inside the same
//! transaction that reads the session and writes the resulting events.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::action::{AttendanceAction, LateClosure};
use crate::error::{AttendanceError, Conflict, Entity};
use crate::event_type::EventType;
use crate::session::AttendanceSession;
use crate::types::{SessionId, StaffId};

/// Checks that a session exists, belongs to `staff_id`, and is still OPEN.
///
/// Ownership is checked before status: a session owned by someone else is
/// reported as not found.
pub fn check_session_access<'a>(
    session: Option<&'a AttendanceSession>,
    session_id: &SessionId,
    staff_id: &StaffId,
) -> Result<&'a AttendanceSession, AttendanceError> {
    let session = session
        .filter(|s| &s.staff_id == staff_id)
        .ok_or_else(|| AttendanceError::not_found(Entity::Session, session_id.as_str()))?;
    if !session.is_open() {
        return Err(Conflict::SessionClosed.into());
    }
    Ok(session)
}

/// Checks that a new session may be opened on `day`.
///
/// `open_session` is the staff member's OPEN session, if any, and is judged
/// stale against `today`; `day_session` is any session already recorded for
/// `day`.
pub fn check_punch_in(
    open_session: Option<&AttendanceSession>,
    day_session: Option<&AttendanceSession>,
    today: NaiveDate,
    day: NaiveDate,
) -> Result<(), Conflict> {
    if let Some(open) = open_session {
        if open.date < today {
            return Err(Conflict::PreviousSessionOpen { date: open.date });
        }
        return Err(Conflict::AlreadyPunchedIn);
    }
    if day_session.is_some() {
        return Err(Conflict::DayAlreadyClosed { date: day });
    }
    Ok(())
}

/// Checks that the latest event permits `action` on an open session.
///
/// PUNCH_OUT is accepted from either phase; an open break is closed by it.
pub fn check_latest_event(
    action: AttendanceAction,
    latest: Option<EventType>,
) -> Result<(), Conflict> {
    match action {
        AttendanceAction::BreakStart => {
            if latest.is_some_and(|kind| kind.is_working()) {
                Ok(())
            } else {
                Err(Conflict::NotWorking)
            }
        }
        AttendanceAction::BreakEnd => {
            if latest == Some(EventType::BreakStart) {
                Ok(())
            } else {
                Err(Conflict::NotOnBreak)
            }
        }
        AttendanceAction::PunchIn
        | AttendanceAction::PunchOut
        | AttendanceAction::LatePunchOutAndPunchIn => Ok(()),
    }
}

/// Checks that an appended event does not precede the session's latest event.
///
/// Equal timestamps are allowed; insertion order breaks the tie.
pub fn check_event_time(
    latest_at: Option<DateTime<FixedOffset>>,
    at: DateTime<FixedOffset>,
) -> Result<(), Conflict> {
    match latest_at {
        Some(latest) if at < latest => Err(Conflict::TimeBeforeLastEvent),
        _ => Ok(()),
    }
}

/// Checks the late-closure parameters against the stale session.
///
/// `new_day` is the reference-zone day of `current_punch_in_time`.
pub fn check_late_closure(
    previous: &AttendanceSession,
    latest_at: Option<DateTime<FixedOffset>>,
    late: &LateClosure,
    new_day: NaiveDate,
) -> Result<(), Conflict> {
    if previous.date >= new_day {
        return Err(Conflict::SessionNotStale {
            date: previous.date,
        });
    }
    check_event_time(latest_at, late.approx_punch_out_time)?;
    if late.current_punch_in_time < late.approx_punch_out_time {
        return Err(Conflict::PunchInBeforePunchOut);
    }
    Ok(())
}
