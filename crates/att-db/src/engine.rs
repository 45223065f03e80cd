//! The transition engine: validated, transactional attendance mutations.
//!
//! Every action runs inside one `BEGIN IMMEDIATE` transaction covering the
//! session read, the precondition checks, the event insert(s) and the session
//! update. A rejected action returns before commit, so the dropped transaction
//! rolls back and nothing is persisted.

use att_core::transition::{
    check_event_time, check_late_closure, check_latest_event, check_punch_in, check_session_access,
};
use att_core::{
    ActionRequest, AttendanceAction, ClosureType, DurationTotals, EventId, EventType, LateClosure,
    ReferenceZone, Resolution, SessionId, SessionStatus, StaffId, StaffMember, aggregate_durations,
    resolve_state,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rusqlite::{Connection, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
    Database, DbError, find_session, format_date, format_instant, format_utc,
    latest_session_event, open_session_for, session_events, session_for_day,
};

/// What a committed action changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub action: AttendanceAction,
    /// The session the caller should act on next.
    pub session_id: SessionId,
    /// Time of the (last) recorded event.
    pub time: DateTime<FixedOffset>,
    pub closed_session_id: Option<SessionId>,
    pub new_session_id: Option<SessionId>,
    /// Totals of the session closed by this action.
    pub totals: Option<DurationTotals>,
}

struct NewEvent<'a> {
    staff: &'a StaffMember,
    session_id: &'a SessionId,
    event_type: EventType,
    at: DateTime<FixedOffset>,
    source: &'a str,
    correction_note: Option<&'a str>,
}

impl Database {
    /// Resolves the staff member's attendance state as of `now`.
    ///
    /// The session and its latest event are read in one transaction so a
    /// concurrent writer cannot be observed half-way.
    pub fn resolve_state(
        &self,
        staff_id: &StaffId,
        now: DateTime<FixedOffset>,
    ) -> Result<Resolution, DbError> {
        let tx = self.conn.unchecked_transaction()?;
        let open = open_session_for(&tx, staff_id)?;
        let latest = match &open {
            Some(session) => latest_session_event(&tx, &session.id)?.map(|e| e.event_type),
            None => None,
        };
        tx.commit()?;

        let today = self.zone.day_of(&now);
        tracing::debug!(staff_id = %staff_id, %today, open = open.is_some(), ?latest, "resolving state");
        Ok(resolve_state(open.as_ref(), latest, today))
    }

    /// Applies a validated action for `staff`.
    ///
    /// `now` stands in for any time the request leaves out, and is recorded as
    /// the late-closure time. `source` is stored on every created event.
    pub fn apply_action(
        &mut self,
        staff: &StaffMember,
        request: &ActionRequest,
        now: DateTime<FixedOffset>,
        source: &str,
    ) -> Result<TransitionOutcome, DbError> {
        let zone = self.zone;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = match request {
            ActionRequest::PunchIn { at } => {
                punch_in(&tx, zone, staff, at.unwrap_or(now), now, source)?
            }
            ActionRequest::BreakStart { session_id, at } => record_break(
                &tx,
                staff,
                AttendanceAction::BreakStart,
                session_id,
                at.unwrap_or(now),
                source,
            )?,
            ActionRequest::BreakEnd { session_id, at } => record_break(
                &tx,
                staff,
                AttendanceAction::BreakEnd,
                session_id,
                at.unwrap_or(now),
                source,
            )?,
            ActionRequest::PunchOut { session_id, at } => {
                punch_out(&tx, staff, session_id, at.unwrap_or(now), source)?
            }
            ActionRequest::LatePunchOutAndPunchIn(late) => {
                late_punch_out_and_punch_in(&tx, zone, staff, late, now, source)?
            }
        };

        tx.commit()?;
        tracing::info!(
            staff_id = %staff.id,
            action = %outcome.action,
            session_id = %outcome.session_id,
            time = %outcome.time,
            "attendance action recorded"
        );
        Ok(outcome)
    }
}

fn punch_in(
    conn: &Connection,
    zone: ReferenceZone,
    staff: &StaffMember,
    at: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    source: &str,
) -> Result<TransitionOutcome, DbError> {
    let day = zone.day_of(&at);
    let open = open_session_for(conn, &staff.id)?;
    let day_session = session_for_day(conn, &staff.id, day)?;
    check_punch_in(open.as_ref(), day_session.as_ref(), zone.day_of(&now), day)?;

    let session_id = start_session(conn, staff, day, at, source)?;
    Ok(TransitionOutcome {
        action: AttendanceAction::PunchIn,
        session_id: session_id.clone(),
        time: at,
        closed_session_id: None,
        new_session_id: Some(session_id),
        totals: None,
    })
}

fn record_break(
    conn: &Connection,
    staff: &StaffMember,
    action: AttendanceAction,
    session_id: &SessionId,
    at: DateTime<FixedOffset>,
    source: &str,
) -> Result<TransitionOutcome, DbError> {
    let event_type = if action == AttendanceAction::BreakStart {
        EventType::BreakStart
    } else {
        EventType::BreakEnd
    };
    check_open_session(conn, staff, action, session_id, at)?;
    append_event(
        conn,
        &NewEvent {
            staff,
            session_id,
            event_type,
            at,
            source,
            correction_note: None,
        },
    )?;
    touch_session(conn, session_id)?;
    Ok(TransitionOutcome {
        action,
        session_id: session_id.clone(),
        time: at,
        closed_session_id: None,
        new_session_id: None,
        totals: None,
    })
}

fn punch_out(
    conn: &Connection,
    staff: &StaffMember,
    session_id: &SessionId,
    at: DateTime<FixedOffset>,
    source: &str,
) -> Result<TransitionOutcome, DbError> {
    check_open_session(conn, staff, AttendanceAction::PunchOut, session_id, at)?;
    append_event(
        conn,
        &NewEvent {
            staff,
            session_id,
            event_type: EventType::PunchOut,
            at,
            source,
            correction_note: None,
        },
    )?;
    let totals = close_session(conn, session_id, ClosureType::Normal, at, None)?;
    Ok(TransitionOutcome {
        action: AttendanceAction::PunchOut,
        session_id: session_id.clone(),
        time: at,
        closed_session_id: Some(session_id.clone()),
        new_session_id: None,
        totals: Some(totals),
    })
}

fn late_punch_out_and_punch_in(
    conn: &Connection,
    zone: ReferenceZone,
    staff: &StaffMember,
    late: &LateClosure,
    now: DateTime<FixedOffset>,
    source: &str,
) -> Result<TransitionOutcome, DbError> {
    let stored = find_session(conn, &late.previous_session_id)?;
    let previous = check_session_access(stored.as_ref(), &late.previous_session_id, &staff.id)?;
    let latest_at = latest_session_event(conn, &previous.id)?.map(|e| e.timestamp);
    let new_day = zone.day_of(&late.current_punch_in_time);
    check_late_closure(previous, latest_at, late, new_day)?;

    // The stale session is the only OPEN one, but the new day may already be taken.
    let day_session = session_for_day(conn, &staff.id, new_day)?;
    check_punch_in(None, day_session.as_ref(), new_day, new_day)?;

    append_event(
        conn,
        &NewEvent {
            staff,
            session_id: &previous.id,
            event_type: EventType::LatePunchOut,
            at: late.approx_punch_out_time,
            source,
            correction_note: late.reason.as_deref(),
        },
    )?;
    let totals = close_session(
        conn,
        &previous.id,
        ClosureType::Late,
        late.approx_punch_out_time,
        Some(LateDetails {
            reason: late.reason.as_deref(),
            recorded_at: now,
        }),
    )?;

    let new_session_id = start_session(conn, staff, new_day, late.current_punch_in_time, source)?;
    Ok(TransitionOutcome {
        action: AttendanceAction::LatePunchOutAndPunchIn,
        session_id: new_session_id.clone(),
        time: late.current_punch_in_time,
        closed_session_id: Some(previous.id.clone()),
        new_session_id: Some(new_session_id),
        totals: Some(totals),
    })
}

/// Ownership, status, latest-event and ordering checks shared by actions on an open session.
fn check_open_session(
    conn: &Connection,
    staff: &StaffMember,
    action: AttendanceAction,
    session_id: &SessionId,
    at: DateTime<FixedOffset>,
) -> Result<(), DbError> {
    let stored = find_session(conn, session_id)?;
    check_session_access(stored.as_ref(), session_id, &staff.id)?;
    let latest = latest_session_event(conn, session_id)?;
    check_latest_event(action, latest.as_ref().map(|e| e.event_type))?;
    check_event_time(latest.map(|e| e.timestamp), at)?;
    Ok(())
}

fn start_session(
    conn: &Connection,
    staff: &StaffMember,
    day: NaiveDate,
    at: DateTime<FixedOffset>,
    source: &str,
) -> Result<SessionId, DbError> {
    let session_id = SessionId::new(Uuid::new_v4().to_string())?;
    let now = format_utc(Utc::now());
    conn.execute(
        "
        INSERT INTO attendance_sessions (
            id, org_id, staff_id, date, status, first_punch_in_at,
            total_work_seconds, total_break_seconds, is_late_closure, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, 0, 0, 0, ?, ?)
        ",
        params![
            session_id.as_str(),
            staff.org_id.as_str(),
            staff.id.as_str(),
            format_date(day),
            SessionStatus::Open.as_str(),
            format_instant(at),
            now,
            now,
        ],
    )?;
    append_event(
        conn,
        &NewEvent {
            staff,
            session_id: &session_id,
            event_type: EventType::PunchIn,
            at,
            source,
            correction_note: None,
        },
    )?;
    Ok(session_id)
}

struct LateDetails<'a> {
    reason: Option<&'a str>,
    recorded_at: DateTime<FixedOffset>,
}

/// Replays the session's events and marks it CLOSED with the resulting totals.
fn close_session(
    conn: &Connection,
    session_id: &SessionId,
    closure: ClosureType,
    punched_out_at: DateTime<FixedOffset>,
    late: Option<LateDetails<'_>>,
) -> Result<DurationTotals, DbError> {
    let events = session_events(conn, session_id)?;
    let totals = aggregate_durations(&events);
    tracing::debug!(
        session_id = %session_id,
        events = events.len(),
        work_ms = totals.work_ms,
        break_ms = totals.break_ms,
        "closing session"
    );

    conn.execute(
        "
        UPDATE attendance_sessions
        SET status = ?, closure_type = ?, last_punch_out_at = ?,
            total_work_seconds = ?, total_break_seconds = ?,
            is_late_closure = ?, late_punch_out_reason = ?, late_punch_out_recorded_at = ?,
            updated_at = ?
        WHERE id = ?
        ",
        params![
            SessionStatus::Closed.as_str(),
            closure.as_str(),
            format_instant(punched_out_at),
            totals.work_seconds(),
            totals.break_seconds(),
            late.is_some(),
            late.as_ref().and_then(|l| l.reason),
            late.as_ref().map(|l| format_instant(l.recorded_at)),
            format_utc(Utc::now()),
            session_id.as_str(),
        ],
    )?;
    Ok(totals)
}

fn touch_session(conn: &Connection, session_id: &SessionId) -> Result<(), DbError> {
    conn.execute(
        "UPDATE attendance_sessions SET updated_at = ? WHERE id = ?",
        params![format_utc(Utc::now()), session_id.as_str()],
    )?;
    Ok(())
}

fn append_event(conn: &Connection, event: &NewEvent<'_>) -> Result<EventId, DbError> {
    let id = EventId::new(Uuid::new_v4().to_string())?;
    conn.execute(
        "
        INSERT INTO attendance_events (
            id, org_id, staff_id, session_id, event_type, timestamp, timestamp_utc,
            source, is_correction, correction_note, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            id.as_str(),
            event.staff.org_id.as_str(),
            event.staff.id.as_str(),
            event.session_id.as_str(),
            event.event_type.as_str(),
            format_instant(event.at),
            format_utc(event.at.with_timezone(&Utc)),
            event.source,
            event.event_type == EventType::LatePunchOut,
            event.correction_note,
            format_utc(Utc::now()),
        ],
    )?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewStaff;
    use crate::tests::{seeded, ts};
    use att_core::{
        ActionParams, AttendanceError, AttendanceState, Conflict, ResolutionAnomaly,
    };
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn conflict(err: DbError) -> Conflict {
        match err {
            DbError::Attendance(AttendanceError::InvalidState(conflict)) => conflict,
            other => panic!("expected invalid state, got {other:?}"),
        }
    }

    fn punch_in(db: &mut Database, staff: &StaffMember, at: &str) -> TransitionOutcome {
        db.apply_action(staff, &ActionRequest::PunchIn { at: Some(ts(at)) }, ts(at), "QR")
            .expect("punch in")
    }

    fn on_session(
        db: &mut Database,
        staff: &StaffMember,
        action: AttendanceAction,
        session_id: &SessionId,
        at: &str,
    ) -> Result<TransitionOutcome, DbError> {
        let params = ActionParams {
            session_id: Some(session_id.to_string()),
            time: Some(at.to_string()),
            ..ActionParams::default()
        };
        let request = ActionRequest::from_params(action, &params).expect("valid params");
        db.apply_action(staff, &request, ts(at), "QR")
    }

    fn event_count(db: &Database) -> i64 {
        db.conn
            .query_row("SELECT COUNT(*) FROM attendance_events", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn full_day_with_one_break() {
        let (mut db, staff) = seeded();
        let session = punch_in(&mut db, &staff, "2025-01-15T09:00:00Z").session_id;

        on_session(&mut db, &staff, AttendanceAction::BreakStart, &session, "2025-01-15T12:00:00Z")
            .unwrap();
        let state = db.resolve_state(&staff.id, ts("2025-01-15T12:10:00Z")).unwrap();
        assert_eq!(state.state.name(), "ON_BREAK");

        on_session(&mut db, &staff, AttendanceAction::BreakEnd, &session, "2025-01-15T12:30:00Z")
            .unwrap();
        let outcome = on_session(
            &mut db,
            &staff,
            AttendanceAction::PunchOut,
            &session,
            "2025-01-15T18:00:00Z",
        )
        .unwrap();
        assert_eq!(outcome.closed_session_id.as_ref(), Some(&session));

        let stored = db.get_session(&session).unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Closed);
        assert_eq!(stored.closure_type, Some(ClosureType::Normal));
        assert_eq!(stored.total_work_seconds, 30_600);
        assert_eq!(stored.total_break_seconds, 1_800);
        assert_eq!(stored.last_punch_out_at, Some(ts("2025-01-15T18:00:00Z")));
        assert!(!stored.is_late_closure);

        let after = db.resolve_state(&staff.id, ts("2025-01-15T18:05:00Z")).unwrap();
        assert_eq!(after.state, AttendanceState::NoSessionToday);
    }

    #[test]
    fn punch_in_then_out_without_break() {
        let (mut db, staff) = seeded();
        let session = punch_in(&mut db, &staff, "2025-01-15T09:00:00Z").session_id;
        let outcome = on_session(
            &mut db,
            &staff,
            AttendanceAction::PunchOut,
            &session,
            "2025-01-15T17:15:30Z",
        )
        .unwrap();
        let totals = outcome.totals.unwrap();
        assert_eq!(totals.work_seconds(), 8 * 3600 + 15 * 60 + 30);
        assert_eq!(totals.break_seconds(), 0);
    }

    #[test]
    fn working_rejects_break_end_and_writes_nothing() {
        let (mut db, staff) = seeded();
        let session = punch_in(&mut db, &staff, "2025-01-15T09:00:00Z").session_id;

        let resolution = db.resolve_state(&staff.id, ts("2025-01-15T10:00:00Z")).unwrap();
        assert_eq!(
            resolution.state.allowed_actions(),
            &[AttendanceAction::BreakStart, AttendanceAction::PunchOut]
        );

        let before = event_count(&db);
        let err = on_session(&mut db, &staff, AttendanceAction::BreakEnd, &session, "2025-01-15T10:00:00Z")
            .unwrap_err();
        assert_eq!(conflict(err), Conflict::NotOnBreak);
        assert_eq!(event_count(&db), before);
    }

    #[test]
    fn punch_out_while_on_break_closes_the_break() {
        let (mut db, staff) = seeded();
        let session = punch_in(&mut db, &staff, "2025-01-15T09:00:00Z").session_id;
        on_session(&mut db, &staff, AttendanceAction::BreakStart, &session, "2025-01-15T12:00:00Z")
            .unwrap();
        let outcome = on_session(
            &mut db,
            &staff,
            AttendanceAction::PunchOut,
            &session,
            "2025-01-15T13:00:00Z",
        )
        .unwrap();

        let totals = outcome.totals.unwrap();
        assert_eq!(totals.work_seconds(), 3 * 3600);
        assert_eq!(totals.break_seconds(), 3600);
        let stored = db.get_session(&session).unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Closed);
        assert_eq!(stored.closure_type, Some(ClosureType::Normal));
        assert_eq!(stored.total_break_seconds, 3600);
    }

    #[test]
    fn repeated_punch_in_is_rejected() {
        let (mut db, staff) = seeded();
        let session = punch_in(&mut db, &staff, "2025-01-15T09:00:00Z").session_id;

        let again = ActionRequest::PunchIn { at: None };
        let err = db
            .apply_action(&staff, &again, ts("2025-01-15T09:05:00Z"), "QR")
            .unwrap_err();
        assert_eq!(conflict(err), Conflict::AlreadyPunchedIn);

        on_session(&mut db, &staff, AttendanceAction::PunchOut, &session, "2025-01-15T17:00:00Z")
            .unwrap();
        let err = db
            .apply_action(&staff, &again, ts("2025-01-15T18:00:00Z"), "QR")
            .unwrap_err();
        assert_eq!(
            conflict(err),
            Conflict::DayAlreadyClosed {
                date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
            }
        );
    }

    #[test]
    fn punch_in_for_a_later_day_with_todays_session_open_is_already_punched_in() {
        let (mut db, staff) = seeded();
        punch_in(&mut db, &staff, "2025-01-15T09:00:00Z");

        let tomorrow = ActionRequest::PunchIn {
            at: Some(ts("2025-01-16T09:00:00Z")),
        };
        let err = db
            .apply_action(&staff, &tomorrow, ts("2025-01-15T10:00:00Z"), "QR")
            .unwrap_err();
        assert_eq!(conflict(err), Conflict::AlreadyPunchedIn);
    }

    #[test]
    fn closed_session_rejects_further_actions() {
        let (mut db, staff) = seeded();
        let session = punch_in(&mut db, &staff, "2025-01-15T09:00:00Z").session_id;
        on_session(&mut db, &staff, AttendanceAction::PunchOut, &session, "2025-01-15T17:00:00Z")
            .unwrap();
        let err = on_session(&mut db, &staff, AttendanceAction::BreakStart, &session, "2025-01-15T17:30:00Z")
            .unwrap_err();
        assert_eq!(conflict(err), Conflict::SessionClosed);
    }

    #[test]
    fn event_time_cannot_precede_latest_event() {
        let (mut db, staff) = seeded();
        let session = punch_in(&mut db, &staff, "2025-01-15T09:00:00Z").session_id;
        let err = on_session(&mut db, &staff, AttendanceAction::BreakStart, &session, "2025-01-15T08:59:00Z")
            .unwrap_err();
        assert_eq!(conflict(err), Conflict::TimeBeforeLastEvent);
    }

    #[test]
    fn forgotten_punch_out_is_closed_late() {
        let (mut db, staff) = seeded();
        let yesterday = punch_in(&mut db, &staff, "2025-01-14T09:00:00Z").session_id;
        let now = ts("2025-01-15T09:00:00Z");

        let resolution = db.resolve_state(&staff.id, now).unwrap();
        assert_eq!(
            resolution.state,
            AttendanceState::PreviousSessionOpen {
                session_id: yesterday.clone(),
                date: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
            }
        );

        let err = db
            .apply_action(&staff, &ActionRequest::PunchIn { at: None }, now, "QR")
            .unwrap_err();
        assert!(err.to_string().contains("previous day session still open"));

        let request = ActionRequest::LatePunchOutAndPunchIn(LateClosure {
            previous_session_id: yesterday.clone(),
            approx_punch_out_time: ts("2025-01-14T18:00:00Z"),
            reason: Some("forgot to scan out".to_string()),
            current_punch_in_time: now,
        });
        let outcome = db.apply_action(&staff, &request, now, "QR").unwrap();
        assert_eq!(outcome.closed_session_id.as_ref(), Some(&yesterday));
        let today = outcome.new_session_id.clone().unwrap();
        assert_eq!(outcome.session_id, today);

        let closed = db.get_session(&yesterday).unwrap().unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);
        assert_eq!(closed.closure_type, Some(ClosureType::Late));
        assert!(closed.is_late_closure);
        assert_eq!(closed.total_work_seconds, 32_400);
        assert_eq!(closed.late_punch_out_reason.as_deref(), Some("forgot to scan out"));
        assert_eq!(closed.late_punch_out_recorded_at, Some(now));

        let late_event = db.list_session_events(&yesterday).unwrap().pop().unwrap();
        assert_eq!(late_event.event_type, EventType::LatePunchOut);
        assert!(late_event.is_correction);
        assert_eq!(late_event.correction_note.as_deref(), Some("forgot to scan out"));

        let opened = db.get_session(&today).unwrap().unwrap();
        assert_eq!(opened.status, SessionStatus::Open);
        assert_eq!(opened.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());

        let after = db.resolve_state(&staff.id, now).unwrap();
        assert_eq!(after.state, AttendanceState::Working { session_id: today });
    }

    #[test]
    fn late_flow_rejects_session_from_today() {
        let (mut db, staff) = seeded();
        let session = punch_in(&mut db, &staff, "2025-01-15T09:00:00Z").session_id;
        let request = ActionRequest::LatePunchOutAndPunchIn(LateClosure {
            previous_session_id: session,
            approx_punch_out_time: ts("2025-01-15T10:00:00Z"),
            reason: None,
            current_punch_in_time: ts("2025-01-15T11:00:00Z"),
        });
        let err = db
            .apply_action(&staff, &request, ts("2025-01-15T11:00:00Z"), "QR")
            .unwrap_err();
        assert!(matches!(conflict(err), Conflict::SessionNotStale { .. }));
    }

    #[test]
    fn foreign_session_is_not_found() {
        let (mut db, ana) = seeded();
        let ben = db
            .add_staff(&NewStaff {
                org_id: ana.org_id.clone(),
                name: "Ben".to_string(),
                employee_code: Some("E-2".to_string()),
                email: None,
            })
            .unwrap();
        let anas_session = punch_in(&mut db, &ana, "2025-01-15T09:00:00Z").session_id;

        let err = on_session(&mut db, &ben, AttendanceAction::BreakStart, &anas_session, "2025-01-15T10:00:00Z")
            .unwrap_err();
        assert_eq!(err.as_attendance().map(AttendanceError::kind), Some("NotFound"));
    }

    #[test]
    fn session_day_follows_reference_zone() {
        let (db, staff) = seeded();
        let mut db = db.with_reference_zone("+05:30".parse().unwrap());
        let session = punch_in(&mut db, &staff, "2025-01-15T01:00:00+05:30").session_id;

        let stored = db.get_session(&session).unwrap().unwrap();
        assert_eq!(stored.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(
            stored.first_punch_in_at.to_rfc3339(),
            "2025-01-15T01:00:00+05:30"
        );
    }

    #[test]
    fn open_session_without_events_resolves_as_no_session() {
        let (db, staff) = seeded();
        db.conn
            .execute(
                "
                INSERT INTO attendance_sessions (
                    id, org_id, staff_id, date, status, first_punch_in_at, created_at, updated_at
                ) VALUES ('orphan', ?, ?, '2025-01-15', 'OPEN', '2025-01-15T09:00:00Z', '', '')
                ",
                params![staff.org_id.as_str(), staff.id.as_str()],
            )
            .unwrap();
        let resolution = db.resolve_state(&staff.id, ts("2025-01-15T10:00:00Z")).unwrap();
        assert_eq!(resolution.state, AttendanceState::NoSessionToday);
        assert_eq!(
            resolution.anomaly,
            Some(ResolutionAnomaly::OpenSessionWithoutEvents)
        );
    }

    #[test]
    fn events_cannot_be_rewritten() {
        let (mut db, staff) = seeded();
        punch_in(&mut db, &staff, "2025-01-15T09:00:00Z");
        assert!(
            db.conn
                .execute("UPDATE attendance_events SET event_type = 'PUNCH_OUT'", [])
                .is_err()
        );
        assert!(db.conn.execute("DELETE FROM attendance_events", []).is_err());
        assert_eq!(event_count(&db), 1);
    }

    #[test]
    fn concurrent_punch_in_admits_exactly_one() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("att.db");
        let staff = {
            let mut db = Database::open(&path).unwrap();
            let org = db.create_organization(Some("acme"), "Acme").unwrap();
            db.add_staff(&NewStaff {
                org_id: org.id,
                name: "Ana".to_string(),
                employee_code: Some("E-1".to_string()),
                email: None,
            })
            .unwrap()
        };

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let mut db = Database::open(&path).unwrap();
                let barrier = Arc::clone(&barrier);
                let staff = staff.clone();
                thread::spawn(move || {
                    barrier.wait();
                    db.apply_action(
                        &staff,
                        &ActionRequest::PunchIn { at: None },
                        ts("2025-01-15T09:00:00Z"),
                        "QR",
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let err = results.into_iter().find_map(Result::err).unwrap();
        assert_eq!(conflict(err), Conflict::AlreadyPunchedIn);

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_sessions(&staff.id, 10).unwrap().len(), 1);
        assert_eq!(event_count(&db), 1);
    }
}
