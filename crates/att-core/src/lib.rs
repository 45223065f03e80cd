//! Core domain logic for attendance tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - State resolution: deriving a staff member's attendance phase from their open session
//! - Duration aggregation: recomputing work/break totals from a session's event log
//! - Transition rules: the preconditions each punch/break action must satisfy
//!
//! Nothing here performs I/O; storage and transactions live in `att-db`.

pub mod action;
mod aggregate;
pub mod day;
pub mod error;
pub mod event_type;
pub mod ports;
pub mod resolver;
pub mod session;
pub mod transition;
pub mod types;

pub use action::{ActionParams, ActionRequest, AttendanceAction, LateClosure};
pub use aggregate::{DurationEvent, DurationTotals, aggregate_durations};
pub use day::ReferenceZone;
pub use error::{AttendanceError, Conflict, Denial, Entity};
pub use event_type::{EventType, UnknownEventType};
pub use ports::{Caller, CredentialStore, Directory, SYSTEM_ROLE, StaffMember};
pub use resolver::{AttendanceState, Resolution, ResolutionAnomaly, resolve_state};
pub use session::{AttendanceEvent, AttendanceSession, ClosureType, SessionStatus};
pub use types::{EmployeeIdentifier, EventId, OrgId, SessionId, StaffId, SystemId, ValidationError};
