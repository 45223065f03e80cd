//! Action command: perform one attendance transition.

use std::io::Write;

use anyhow::Result;
use att_core::{ActionParams, ActionRequest, AttendanceAction, AttendanceError, Conflict, SessionId};
use att_db::{Database, DbError, TransitionOutcome};
use chrono::SecondsFormat;
use clap::Args;
use serde::Serialize;

use super::{Disposition, authorize, now_in, parse_time, reject, rejection, write_json};
use crate::cli::CallerArgs;

#[derive(Debug, Clone, Args)]
pub struct ActionArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    /// PUNCH_IN, BREAK_START, BREAK_END, PUNCH_OUT or LATE_PUNCH_OUT_AND_PUNCH_IN.
    pub action: String,

    /// Action parameters as a JSON object, e.g. '{"sessionId":"..."}'.
    #[arg(long)]
    pub params: Option<String>,

    /// Reference instant used for omitted times (ISO-8601). Defaults to now.
    #[arg(long)]
    pub now: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub status: &'static str,
    pub result: AttendanceAction,
    pub session_id: SessionId,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_work_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_break_seconds: Option<i64>,
}

impl From<TransitionOutcome> for ActionResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            status: "ok",
            result: outcome.action,
            session_id: outcome.session_id,
            time: outcome.time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            closed_session_id: outcome.closed_session_id,
            new_session_id: outcome.new_session_id,
            total_work_seconds: outcome.totals.map(|t| t.work_seconds()),
            total_break_seconds: outcome.totals.map(|t| t.break_seconds()),
        }
    }
}

fn parse_params(raw: Option<&str>) -> Result<ActionParams, AttendanceError> {
    let Some(raw) = raw else {
        return Ok(ActionParams::default());
    };
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|err| Conflict::InvalidField {
        field: "actionParams",
        value: err.to_string(),
    })?;
    ActionParams::from_json(&value)
}

/// Authorizes, validates and applies the requested action.
pub fn perform(
    db: &mut Database,
    args: &ActionArgs,
    source: &str,
) -> Result<TransitionOutcome, DbError> {
    let staff = authorize(db, &args.caller)?;
    let action: AttendanceAction = args.action.parse()?;
    let params = parse_params(args.params.as_deref())?;
    let request = ActionRequest::from_params(action, &params)?;
    let now = match args.now.as_deref() {
        Some(raw) => parse_time("now", raw)?,
        None => now_in(db.reference_zone()),
    };
    db.apply_action(&staff, &request, now, source)
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &ActionArgs,
    source: &str,
) -> Result<Disposition> {
    match perform(db, args, source) {
        Ok(outcome) => {
            write_json(writer, &ActionResponse::from(outcome))?;
            Ok(Disposition::Accepted)
        }
        Err(err) => reject(writer, &rejection(err)?),
    }
}
