//! Recompute session totals from the event log.
//!
//! Replays the duration aggregation over every closed session and reports
//! sessions whose stored totals disagree with their events.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::OrgId;
use att_db::Database;

use super::history::format_duration;

/// Run the replay, optionally writing corrected totals back.
///
/// # Arguments
///
/// * `org` - Only check sessions of this organization
/// * `apply` - If true, store the replayed totals for drifted sessions
pub fn run<W: Write>(writer: &mut W, db: &mut Database, org: Option<&str>, apply: bool) -> Result<()> {
    let org_id = org.map(OrgId::new).transpose()?;
    let replay = db
        .replay_closed_sessions(org_id.as_ref())
        .context("failed to replay sessions")?;

    writeln!(
        writer,
        "Checked {} closed session(s); {} drifted.",
        replay.sessions_checked,
        replay.drifts.len()
    )?;
    for drift in &replay.drifts {
        writeln!(
            writer,
            "- {} {}: work {} -> {}, break {} -> {}",
            drift.date,
            drift.session_id,
            format_duration(drift.stored_work_seconds),
            format_duration(drift.replayed_work_seconds),
            format_duration(drift.stored_break_seconds),
            format_duration(drift.replayed_break_seconds),
        )?;
    }

    if replay.drifts.is_empty() {
        return Ok(());
    }
    if apply {
        let updated = db
            .apply_replayed_totals(&replay.drifts)
            .context("failed to update session totals")?;
        writeln!(writer, "Updated {updated} session(s).")?;
    } else {
        writeln!(writer, "Run with --apply to store the replayed totals.")?;
    }
    Ok(())
}
