//! Storage layer for attendance tracking.
//!
//! Provides persistence for organizations, staff, attendance sessions and
//! their event log using `rusqlite`, and hosts the transition engine that
//! mutates them.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Concurrent writers use separate `Database` instances (one connection each).
//! Every mutating attendance action runs in a `BEGIN IMMEDIATE` transaction,
//! so two connections acting on the same session are serialized by SQLite's
//! write lock; the loser waits up to [`BUSY_TIMEOUT`] before failing.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Event and session timestamps are stored as TEXT in RFC 3339 format with the
//! caller's original UTC offset (e.g., `2024-01-15T09:00:00+05:30`), so they
//! round-trip unchanged. Events additionally store `timestamp_utc`, a fixed-width
//! UTC rendering used for ordering; `seq` (insertion order) breaks ties.
//!
//! ## Session Dates
//!
//! `attendance_sessions.date` is the calendar day (`YYYY-MM-DD`) of the punch-in
//! in the database's [`ReferenceZone`].
//!
//! ## Immutability
//!
//! Triggers reject any UPDATE or DELETE on `attendance_events`. Corrections are
//! appended as new events.

mod directory;
mod engine;
mod recompute;

use std::path::Path;
use std::time::Duration;

use att_core::{
    AttendanceError, AttendanceEvent, AttendanceSession, Conflict, Entity, EventId, EventType,
    OrgId, ReferenceZone, SessionId, StaffId, StaffMember, SystemId, ValidationError,
};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use thiserror::Error;
use uuid::Uuid;

pub use engine::TransitionOutcome;
pub use recompute::{SessionReplay, TotalsDrift};

/// How long a connection waits for another writer's lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The request was rejected; nothing was written.
    #[error(transparent)]
    Attendance(#[from] AttendanceError),
    /// A stored identifier or value failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Failed to parse a stored timestamp or date.
    #[error("invalid {column} value: {value}")]
    TimestampParse {
        column: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row holds a value outside its domain.
    #[error("invalid {table} row: {message}")]
    InvalidRow { table: &'static str, message: String },
}

impl DbError {
    /// The attendance rejection behind this error, if that is what it is.
    pub const fn as_attendance(&self) -> Option<&AttendanceError> {
        match self {
            Self::Attendance(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Conflict> for DbError {
    fn from(conflict: Conflict) -> Self {
        Self::Attendance(conflict.into())
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
    zone: ReferenceZone,
}

/// An organization (tenant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
}

/// A staff member to be added to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaff {
    pub org_id: OrgId,
    pub name: String,
    pub employee_code: Option<String>,
    pub email: Option<String>,
}

/// Row counts for the status command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub organizations: i64,
    pub staff: i64,
    pub open_sessions: i64,
    /// OPEN sessions dated before the given day.
    pub stale_open_sessions: i64,
    pub events: i64,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn,
            zone: ReferenceZone::utc(),
        };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            zone: ReferenceZone::utc(),
        };
        db.init()?;
        Ok(db)
    }

    /// Sets the zone that defines session calendar days.
    #[must_use]
    pub const fn with_reference_zone(mut self, zone: ReferenceZone) -> Self {
        self.zone = zone;
        self
    }

    pub const fn reference_zone(&self) -> ReferenceZone {
        self.zone
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS organizations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Service identities allowed to drive scans for one organization
            CREATE TABLE IF NOT EXISTS system_identities (
                id TEXT PRIMARY KEY,
                org_id TEXT NOT NULL,
                label TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (org_id) REFERENCES organizations(id)
            );

            CREATE TABLE IF NOT EXISTS staff (
                id TEXT PRIMARY KEY,
                org_id TEXT NOT NULL,
                name TEXT NOT NULL,
                employee_code TEXT UNIQUE,
                email TEXT UNIQUE,
                badge_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                FOREIGN KEY (org_id) REFERENCES organizations(id)
            );

            CREATE INDEX IF NOT EXISTS idx_staff_org ON staff(org_id);

            -- One row per staff member per calendar day
            -- date: reference-zone day, 'YYYY-MM-DD'
            -- status: 'OPEN' | 'CLOSED'; closure_type: 'NORMAL' | 'LATE' | NULL
            CREATE TABLE IF NOT EXISTS attendance_sessions (
                id TEXT PRIMARY KEY,
                org_id TEXT NOT NULL,
                staff_id TEXT NOT NULL,
                date TEXT NOT NULL,
                status TEXT NOT NULL,
                closure_type TEXT,
                first_punch_in_at TEXT NOT NULL,
                last_punch_out_at TEXT,
                total_work_seconds INTEGER NOT NULL DEFAULT 0,
                total_break_seconds INTEGER NOT NULL DEFAULT 0,
                is_late_closure INTEGER NOT NULL DEFAULT 0,
                late_punch_out_reason TEXT,
                late_punch_out_recorded_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (staff_id, date),
                FOREIGN KEY (org_id) REFERENCES organizations(id),
                FOREIGN KEY (staff_id) REFERENCES staff(id)
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_open
                ON attendance_sessions(staff_id) WHERE status = 'OPEN';
            CREATE INDEX IF NOT EXISTS idx_sessions_org_date ON attendance_sessions(org_id, date);

            -- Append-only event log
            -- timestamp: RFC 3339 with the caller's offset
            -- timestamp_utc: fixed-width UTC, for ordering
            CREATE TABLE IF NOT EXISTS attendance_events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                org_id TEXT NOT NULL,
                staff_id TEXT NOT NULL,
                session_id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                timestamp_utc TEXT NOT NULL,
                source TEXT NOT NULL,
                is_correction INTEGER NOT NULL DEFAULT 0,
                correction_note TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES attendance_sessions(id)
            );

            CREATE INDEX IF NOT EXISTS idx_events_session
                ON attendance_events(session_id, timestamp_utc, seq);

            CREATE TRIGGER IF NOT EXISTS attendance_events_no_update
            BEFORE UPDATE ON attendance_events
            BEGIN
                SELECT RAISE(ABORT, 'attendance events are immutable');
            END;

            CREATE TRIGGER IF NOT EXISTS attendance_events_no_delete
            BEFORE DELETE ON attendance_events
            BEGIN
                SELECT RAISE(ABORT, 'attendance events are immutable');
            END;
            ",
        )?;
        Ok(())
    }

    /// Creates an organization, generating an ID when none is given.
    pub fn create_organization(
        &mut self,
        id: Option<&str>,
        name: &str,
    ) -> Result<Organization, DbError> {
        let id = match id {
            Some(id) => OrgId::new(id)?,
            None => OrgId::new(Uuid::new_v4().to_string())?,
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "organization name",
            }
            .into());
        }
        self.conn.execute(
            "INSERT INTO organizations (id, name, created_at) VALUES (?, ?, ?)",
            params![id.as_str(), name, format_utc(Utc::now())],
        )?;
        tracing::info!(org_id = %id, "organization created");
        Ok(Organization {
            id,
            name: name.to_string(),
        })
    }

    /// Lists organizations ordered by name.
    pub fn list_organizations(&self) -> Result<Vec<Organization>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM organizations ORDER BY name ASC, id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut orgs = Vec::new();
        for row in rows {
            let (id, name) = row?;
            orgs.push(Organization {
                id: OrgId::new(id)?,
                name,
            });
        }
        Ok(orgs)
    }

    /// Registers a service identity bound to `org_id`.
    pub fn register_system(
        &mut self,
        org_id: &OrgId,
        label: Option<&str>,
    ) -> Result<SystemId, DbError> {
        if !organization_exists(&self.conn, org_id)? {
            return Err(AttendanceError::not_found(Entity::Organization, org_id.as_str()).into());
        }
        let id = SystemId::new(Uuid::new_v4().to_string())?;
        self.conn.execute(
            "INSERT INTO system_identities (id, org_id, label, created_at) VALUES (?, ?, ?, ?)",
            params![id.as_str(), org_id.as_str(), label, format_utc(Utc::now())],
        )?;
        tracing::info!(org_id = %org_id, system_id = %id, "system identity registered");
        Ok(id)
    }

    /// Adds a staff member. At least one of code or email is required.
    pub fn add_staff(&mut self, new: &NewStaff) -> Result<StaffMember, DbError> {
        if !organization_exists(&self.conn, &new.org_id)? {
            return Err(
                AttendanceError::not_found(Entity::Organization, new.org_id.as_str()).into(),
            );
        }
        let name = new.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "staff name" }.into());
        }
        let employee_code = new
            .employee_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let email = new
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_lowercase);
        if employee_code.is_none() && email.is_none() {
            return Err(Conflict::NoEmployeeIdentifier.into());
        }

        let id = StaffId::new(Uuid::new_v4().to_string())?;
        self.conn.execute(
            "
            INSERT INTO staff (id, org_id, name, employee_code, email, badge_active, created_at)
            VALUES (?, ?, ?, ?, ?, 1, ?)
            ",
            params![
                id.as_str(),
                new.org_id.as_str(),
                name,
                employee_code,
                email,
                format_utc(Utc::now()),
            ],
        )?;
        tracing::info!(org_id = %new.org_id, staff_id = %id, "staff member added");
        Ok(StaffMember {
            id,
            org_id: new.org_id.clone(),
            name: name.to_string(),
            employee_code,
            email,
            badge_active: true,
        })
    }

    /// Activates or deactivates a staff member's badge.
    pub fn set_badge_active(&mut self, staff_id: &StaffId, active: bool) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "UPDATE staff SET badge_active = ? WHERE id = ?",
            params![active, staff_id.as_str()],
        )?;
        if updated == 0 {
            return Err(AttendanceError::not_found(Entity::Staff, staff_id.as_str()).into());
        }
        tracing::info!(staff_id = %staff_id, active, "badge status changed");
        Ok(())
    }

    /// Looks up a staff member by ID.
    pub fn get_staff(&self, staff_id: &StaffId) -> Result<Option<StaffMember>, DbError> {
        query_staff(&self.conn, "WHERE id = ?", [staff_id.as_str()])
            .map(|mut staff| staff.pop())
    }

    /// Looks up a session by ID.
    pub fn get_session(&self, session_id: &SessionId) -> Result<Option<AttendanceSession>, DbError> {
        find_session(&self.conn, session_id)
    }

    /// Lists a staff member's sessions, most recent day first.
    pub fn list_sessions(
        &self,
        staff_id: &StaffId,
        limit: usize,
    ) -> Result<Vec<AttendanceSession>, DbError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        query_sessions(
            &self.conn,
            "WHERE staff_id = ? ORDER BY date DESC LIMIT ?",
            params![staff_id.as_str(), limit],
        )
    }

    /// Lists a session's events in replay order.
    pub fn list_session_events(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceEvent>, DbError> {
        session_events(&self.conn, session_id)
    }

    /// Row counts, with OPEN sessions dated before `today` counted as stale.
    pub fn stats(&self, today: NaiveDate) -> Result<DatabaseStats, DbError> {
        let count = |sql: &str| -> Result<i64, DbError> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };
        let stale_open_sessions = self.conn.query_row(
            "SELECT COUNT(*) FROM attendance_sessions WHERE status = 'OPEN' AND date < ?",
            [format_date(today)],
            |row| row.get(0),
        )?;
        Ok(DatabaseStats {
            organizations: count("SELECT COUNT(*) FROM organizations")?,
            staff: count("SELECT COUNT(*) FROM staff")?,
            open_sessions: count("SELECT COUNT(*) FROM attendance_sessions WHERE status = 'OPEN'")?,
            stale_open_sessions,
            events: count("SELECT COUNT(*) FROM attendance_events")?,
        })
    }
}

const SESSION_COLUMNS: &str = "
    id, org_id, staff_id, date, status, closure_type, first_punch_in_at, last_punch_out_at,
    total_work_seconds, total_break_seconds, is_late_closure, late_punch_out_reason,
    late_punch_out_recorded_at
";

const EVENT_COLUMNS: &str = "
    id, org_id, staff_id, session_id, event_type, timestamp, source, is_correction, correction_note
";

const STAFF_COLUMNS: &str = "id, org_id, name, employee_code, email, badge_active";

#[derive(Debug)]
struct SessionRow {
    id: String,
    org_id: String,
    staff_id: String,
    date: String,
    status: String,
    closure_type: Option<String>,
    first_punch_in_at: String,
    last_punch_out_at: Option<String>,
    total_work_seconds: i64,
    total_break_seconds: i64,
    is_late_closure: bool,
    late_punch_out_reason: Option<String>,
    late_punch_out_recorded_at: Option<String>,
}

impl SessionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            org_id: row.get(1)?,
            staff_id: row.get(2)?,
            date: row.get(3)?,
            status: row.get(4)?,
            closure_type: row.get(5)?,
            first_punch_in_at: row.get(6)?,
            last_punch_out_at: row.get(7)?,
            total_work_seconds: row.get(8)?,
            total_break_seconds: row.get(9)?,
            is_late_closure: row.get(10)?,
            late_punch_out_reason: row.get(11)?,
            late_punch_out_recorded_at: row.get(12)?,
        })
    }

    fn into_session(self) -> Result<AttendanceSession, DbError> {
        let invalid = |message: String| DbError::InvalidRow {
            table: "attendance_sessions",
            message,
        };
        Ok(AttendanceSession {
            status: self.status.parse().map_err(invalid)?,
            closure_type: self
                .closure_type
                .map(|c| c.parse())
                .transpose()
                .map_err(invalid)?,
            date: parse_date(&self.date)?,
            first_punch_in_at: parse_instant("first_punch_in_at", &self.first_punch_in_at)?,
            last_punch_out_at: parse_optional_instant(
                "last_punch_out_at",
                self.last_punch_out_at.as_deref(),
            )?,
            late_punch_out_recorded_at: parse_optional_instant(
                "late_punch_out_recorded_at",
                self.late_punch_out_recorded_at.as_deref(),
            )?,
            id: SessionId::new(self.id)?,
            org_id: OrgId::new(self.org_id)?,
            staff_id: StaffId::new(self.staff_id)?,
            total_work_seconds: self.total_work_seconds,
            total_break_seconds: self.total_break_seconds,
            is_late_closure: self.is_late_closure,
            late_punch_out_reason: self.late_punch_out_reason,
        })
    }
}

#[derive(Debug)]
struct EventRow {
    id: String,
    org_id: String,
    staff_id: String,
    session_id: String,
    event_type: String,
    timestamp: String,
    source: String,
    is_correction: bool,
    correction_note: Option<String>,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            org_id: row.get(1)?,
            staff_id: row.get(2)?,
            session_id: row.get(3)?,
            event_type: row.get(4)?,
            timestamp: row.get(5)?,
            source: row.get(6)?,
            is_correction: row.get(7)?,
            correction_note: row.get(8)?,
        })
    }

    fn into_event(self) -> Result<AttendanceEvent, DbError> {
        let event_type: EventType = self.event_type.parse().map_err(|err| DbError::InvalidRow {
            table: "attendance_events",
            message: format!("{err}"),
        })?;
        Ok(AttendanceEvent {
            timestamp: parse_instant("timestamp", &self.timestamp)?,
            id: EventId::new(self.id)?,
            org_id: OrgId::new(self.org_id)?,
            staff_id: StaffId::new(self.staff_id)?,
            session_id: SessionId::new(self.session_id)?,
            event_type,
            source: self.source,
            is_correction: self.is_correction,
            correction_note: self.correction_note,
        })
    }
}

fn staff_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, Option<String>, Option<String>, bool)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

pub(crate) fn query_staff<P: Params>(
    conn: &Connection,
    clause: &str,
    params: P,
) -> Result<Vec<StaffMember>, DbError> {
    let sql = format!("SELECT {STAFF_COLUMNS} FROM staff {clause}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, staff_from_row)?;
    let mut staff = Vec::new();
    for row in rows {
        let (id, org_id, name, employee_code, email, badge_active) = row?;
        staff.push(StaffMember {
            id: StaffId::new(id)?,
            org_id: OrgId::new(org_id)?,
            name,
            employee_code,
            email,
            badge_active,
        });
    }
    Ok(staff)
}

pub(crate) fn query_sessions<P: Params>(
    conn: &Connection,
    clause: &str,
    params: P,
) -> Result<Vec<AttendanceSession>, DbError> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM attendance_sessions {clause}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, SessionRow::from_row)?;
    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row?.into_session()?);
    }
    Ok(sessions)
}

pub(crate) fn query_events<P: Params>(
    conn: &Connection,
    clause: &str,
    params: P,
) -> Result<Vec<AttendanceEvent>, DbError> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM attendance_events {clause}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, EventRow::from_row)?;
    let mut events = Vec::new();
    for row in rows {
        events.push(row?.into_event()?);
    }
    Ok(events)
}

pub(crate) fn find_session(
    conn: &Connection,
    session_id: &SessionId,
) -> Result<Option<AttendanceSession>, DbError> {
    query_sessions(conn, "WHERE id = ?", [session_id.as_str()]).map(|mut sessions| sessions.pop())
}

/// The staff member's OPEN session, if any.
pub(crate) fn open_session_for(
    conn: &Connection,
    staff_id: &StaffId,
) -> Result<Option<AttendanceSession>, DbError> {
    query_sessions(
        conn,
        "WHERE staff_id = ? AND status = 'OPEN'",
        [staff_id.as_str()],
    )
    .map(|mut sessions| sessions.pop())
}

/// The staff member's session for `date`, whatever its status.
pub(crate) fn session_for_day(
    conn: &Connection,
    staff_id: &StaffId,
    date: NaiveDate,
) -> Result<Option<AttendanceSession>, DbError> {
    query_sessions(
        conn,
        "WHERE staff_id = ? AND date = ?",
        params![staff_id.as_str(), format_date(date)],
    )
    .map(|mut sessions| sessions.pop())
}

/// A session's events ordered by timestamp, then insertion order.
pub(crate) fn session_events(
    conn: &Connection,
    session_id: &SessionId,
) -> Result<Vec<AttendanceEvent>, DbError> {
    query_events(
        conn,
        "WHERE session_id = ? ORDER BY timestamp_utc ASC, seq ASC",
        [session_id.as_str()],
    )
}

/// The session's latest event by timestamp, ties broken by insertion order.
pub(crate) fn latest_session_event(
    conn: &Connection,
    session_id: &SessionId,
) -> Result<Option<AttendanceEvent>, DbError> {
    query_events(
        conn,
        "WHERE session_id = ? ORDER BY timestamp_utc DESC, seq DESC LIMIT 1",
        [session_id.as_str()],
    )
    .map(|mut events| events.pop())
}

pub(crate) fn organization_exists(conn: &Connection, org_id: &OrgId) -> Result<bool, DbError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM organizations WHERE id = ?",
            [org_id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn format_instant(timestamp: DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn format_utc(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_instant(column: &'static str, value: &str) -> Result<DateTime<FixedOffset>, DbError> {
    DateTime::parse_from_rfc3339(value).map_err(|source| DbError::TimestampParse {
        column,
        value: value.to_string(),
        source,
    })
}

fn parse_optional_instant(
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>, DbError> {
    value.map(|v| parse_instant(column, v)).transpose()
}

fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| DbError::TimestampParse {
        column: "date",
        value: value.to_string(),
        source,
    })
}
