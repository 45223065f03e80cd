//! CLI subcommand implementations.

pub mod action;
pub mod admin;
pub mod history;
pub mod recompute;
pub mod scan;
pub mod status;

use std::io::Write;

use anyhow::{Context, Result};
use att_core::ports::{authorize_caller, resolve_staff};
use att_core::{
    AttendanceError, Caller, Conflict, EmployeeIdentifier, OrgId, ReferenceZone, StaffMember,
    SystemId,
};
use att_db::{Database, DbError};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::cli::CallerArgs;

/// Whether a request was carried out or rejected with a structured failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Accepted,
    Rejected,
}

/// Structured failure written in place of a result.
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub status: &'static str,
    pub kind: &'static str,
    pub message: String,
}

impl From<&AttendanceError> for FailureResponse {
    fn from(error: &AttendanceError) -> Self {
        Self {
            status: "error",
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Writes `value` as one line of JSON.
pub(crate) fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, value).context("failed to serialize output")?;
    writeln!(writer)?;
    Ok(())
}

/// Writes the structured failure for a rejected request.
pub(crate) fn reject<W: Write>(writer: &mut W, error: &AttendanceError) -> Result<Disposition> {
    tracing::info!(kind = error.kind(), %error, "request rejected");
    write_json(writer, &FailureResponse::from(error))?;
    Ok(Disposition::Rejected)
}

/// Splits a rejection from a storage failure.
pub(crate) fn rejection(err: DbError) -> Result<AttendanceError> {
    match err {
        DbError::Attendance(err) => Ok(err),
        other => Err(other).context("database error"),
    }
}

/// The current instant, expressed in the reference zone's offset.
pub(crate) fn now_in(zone: ReferenceZone) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&zone.offset())
}

/// Parses an ISO-8601 timestamp supplied on the command line.
pub(crate) fn parse_time(
    field: &'static str,
    raw: &str,
) -> Result<DateTime<FixedOffset>, AttendanceError> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| {
        Conflict::InvalidField {
            field,
            value: raw.to_string(),
        }
        .into()
    })
}

/// Authorizes the caller and resolves the scanned staff member.
pub(crate) fn authorize(db: &Database, args: &CallerArgs) -> Result<StaffMember, DbError> {
    let caller = Caller {
        org_id: OrgId::new(args.org.as_str())
            .map_err(|_| AttendanceError::from(Conflict::MissingField("org")))?,
        system_id: SystemId::new(args.system.as_str())
            .map_err(|_| AttendanceError::from(Conflict::MissingField("system")))?,
        role: args.role.clone(),
    };
    authorize_caller(db, &caller)?;
    let identifier = EmployeeIdentifier::from_parts(args.code.as_deref(), args.email.as_deref())
        .ok_or_else(|| AttendanceError::from(Conflict::NoEmployeeIdentifier))?;
    resolve_staff(db, &caller.org_id, &identifier)
}
