//! Session and event history.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::{AttendanceEvent, AttendanceSession, SessionId, StaffId};
use att_db::Database;
use chrono::SecondsFormat;

/// Formats whole seconds as `8h 30m` or `45m`.
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return "0m".to_string();
    }
    let total_minutes = seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn write_sessions<W: Write>(writer: &mut W, sessions: &[AttendanceSession]) -> Result<()> {
    if sessions.is_empty() {
        writeln!(writer, "No sessions.")?;
        return Ok(());
    }
    for session in sessions {
        let closure = session
            .closure_type
            .map_or("-", |closure| closure.as_str());
        writeln!(
            writer,
            "{}  {:<6}  {:<6}  work {:>7}  break {:>7}  {}",
            session.date,
            session.status.as_str(),
            closure,
            format_duration(session.total_work_seconds),
            format_duration(session.total_break_seconds),
            session.id,
        )?;
        if let Some(reason) = &session.late_punch_out_reason {
            writeln!(writer, "    late closure: {reason}")?;
        }
    }
    Ok(())
}

fn write_events<W: Write>(writer: &mut W, events: &[AttendanceEvent]) -> Result<()> {
    if events.is_empty() {
        writeln!(writer, "No events.")?;
        return Ok(());
    }
    for event in events {
        write!(
            writer,
            "{}  {:<14}  {}",
            event.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            event.event_type.as_str(),
            event.source,
        )?;
        if event.is_correction {
            write!(writer, "  correction")?;
            if let Some(note) = &event.correction_note {
                write!(writer, ": {note}")?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn sessions<W: Write>(
    writer: &mut W,
    db: &Database,
    staff_id: &str,
    limit: usize,
    json: bool,
) -> Result<()> {
    let staff_id = StaffId::new(staff_id)?;
    let sessions = db
        .list_sessions(&staff_id, limit)
        .context("failed to list sessions")?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&sessions)?)?;
        return Ok(());
    }
    write_sessions(writer, &sessions)
}

pub fn events<W: Write>(writer: &mut W, db: &Database, session_id: &str, json: bool) -> Result<()> {
    let session_id = SessionId::new(session_id)?;
    let events = db
        .list_session_events(&session_id)
        .context("failed to list session events")?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&events)?)?;
        return Ok(());
    }
    write_events(writer, &events)
}
