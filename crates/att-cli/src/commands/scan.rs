//! Scan command: resolve a staff member's attendance state.
//!
//! Read-only. Reports the state, the session it refers to and the actions a
//! scanner should offer next.

use std::io::Write;

use anyhow::Result;
use att_core::{AttendanceAction, AttendanceState, Resolution, SessionId, StaffId, StaffMember};
use att_db::{Database, DbError};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use super::{Disposition, authorize, now_in, parse_time, reject, rejection, write_json};
use crate::cli::CallerArgs;

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    /// Scan time (ISO-8601 with offset). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub staff_id: StaffId,
    pub staff_name: String,
    pub state: AttendanceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub allowed_actions: &'static [AttendanceAction],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScanResponse {
    fn new(staff: StaffMember, resolution: Resolution) -> Self {
        let previous_date = match &resolution.state {
            AttendanceState::PreviousSessionOpen { date, .. } => Some(*date),
            _ => None,
        };
        let message = match (resolution.anomaly, previous_date) {
            (Some(anomaly), _) => Some(anomaly.message().to_string()),
            (None, Some(date)) => Some(format!(
                "previous day session still open (dated {date}); close it with {}",
                AttendanceAction::LatePunchOutAndPunchIn
            )),
            (None, None) => None,
        };
        Self {
            staff_id: staff.id,
            staff_name: staff.name,
            session_id: resolution.state.session_id().cloned(),
            allowed_actions: resolution.state.allowed_actions(),
            state: resolution.state,
            previous_date,
            message,
        }
    }
}

/// Resolves the scanned staff member's state.
pub fn scan(db: &Database, args: &ScanArgs) -> Result<ScanResponse, DbError> {
    let staff = authorize(db, &args.caller)?;
    let at = match args.at.as_deref() {
        Some(raw) => parse_time("scanTime", raw)?,
        None => now_in(db.reference_zone()),
    };
    let resolution = db.resolve_state(&staff.id, at)?;
    Ok(ScanResponse::new(staff, resolution))
}

pub fn run<W: Write>(writer: &mut W, db: &Database, args: &ScanArgs) -> Result<Disposition> {
    match scan(db, args) {
        Ok(response) => {
            write_json(writer, &response)?;
            Ok(Disposition::Accepted)
        }
        Err(err) => reject(writer, &rejection(err)?),
    }
}
