//! Replays stored event logs to audit session totals.

use std::collections::HashMap;

use att_core::{
    AttendanceEvent, AttendanceSession, DurationTotals, OrgId, SessionId, StaffId,
    aggregate_durations,
};
use chrono::{NaiveDate, Utc};
use rayon::prelude::*;
use rusqlite::params;

use crate::{Database, DbError, format_utc, query_events, query_sessions};

/// A closed session whose stored totals disagree with its event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsDrift {
    pub session_id: SessionId,
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub stored_work_seconds: i64,
    pub stored_break_seconds: i64,
    pub replayed_work_seconds: i64,
    pub replayed_break_seconds: i64,
}

/// Outcome of replaying closed sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReplay {
    pub sessions_checked: usize,
    pub drifts: Vec<TotalsDrift>,
}

fn replay(session: &AttendanceSession, events: &[AttendanceEvent]) -> Option<TotalsDrift> {
    let totals: DurationTotals = aggregate_durations(events);
    let (work, brk) = (totals.work_seconds(), totals.break_seconds());
    if work == session.total_work_seconds && brk == session.total_break_seconds {
        return None;
    }
    Some(TotalsDrift {
        session_id: session.id.clone(),
        staff_id: session.staff_id.clone(),
        date: session.date,
        stored_work_seconds: session.total_work_seconds,
        stored_break_seconds: session.total_break_seconds,
        replayed_work_seconds: work,
        replayed_break_seconds: brk,
    })
}

impl Database {
    /// Recomputes totals for every CLOSED session (optionally one organization's)
    /// from its events and reports those that drifted.
    pub fn replay_closed_sessions(&self, org_id: Option<&OrgId>) -> Result<SessionReplay, DbError> {
        let tx = self.conn.unchecked_transaction()?;
        let org = org_id.map(OrgId::as_str);
        let sessions = query_sessions(
            &tx,
            "WHERE status = 'CLOSED' AND (?1 IS NULL OR org_id = ?1) ORDER BY date ASC, id ASC",
            params![org],
        )?;
        let events = query_events(
            &tx,
            "
            WHERE session_id IN (
                SELECT id FROM attendance_sessions
                WHERE status = 'CLOSED' AND (?1 IS NULL OR org_id = ?1)
            )
            ORDER BY timestamp_utc ASC, seq ASC
            ",
            params![org],
        )?;
        tx.commit()?;

        let mut by_session: HashMap<SessionId, Vec<AttendanceEvent>> = HashMap::new();
        for event in events {
            by_session
                .entry(event.session_id.clone())
                .or_default()
                .push(event);
        }
        tracing::debug!(
            sessions = sessions.len(),
            with_events = by_session.len(),
            "replaying closed sessions"
        );

        let mut drifts: Vec<TotalsDrift> = sessions
            .par_iter()
            .filter_map(|session| {
                let events = by_session.get(&session.id).map_or(&[][..], Vec::as_slice);
                replay(session, events)
            })
            .collect();
        drifts.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.session_id.as_str().cmp(b.session_id.as_str()))
        });

        for drift in &drifts {
            tracing::warn!(
                session_id = %drift.session_id,
                stored_work = drift.stored_work_seconds,
                replayed_work = drift.replayed_work_seconds,
                "session totals drifted from event log"
            );
        }
        Ok(SessionReplay {
            sessions_checked: sessions.len(),
            drifts,
        })
    }

    /// Writes replayed totals back in one transaction. Returns the number of sessions updated.
    pub fn apply_replayed_totals(&mut self, drifts: &[TotalsDrift]) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare(
                "
                UPDATE attendance_sessions
                SET total_work_seconds = ?, total_break_seconds = ?, updated_at = ?
                WHERE id = ? AND status = 'CLOSED'
                ",
            )?;
            let now = format_utc(Utc::now());
            for drift in drifts {
                updated += stmt.execute(params![
                    drift.replayed_work_seconds,
                    drift.replayed_break_seconds,
                    now,
                    drift.session_id.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        tracing::info!(updated, "replayed totals written");
        Ok(updated)
    }
}
