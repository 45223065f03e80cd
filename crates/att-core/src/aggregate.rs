//! Work and break duration totals derived from a session's event log.
//!
//! # Algorithm Summary
//!
//! 1. Order events by timestamp (stable, so equal timestamps keep insertion order)
//! 2. Track at most one open work interval and one open break interval
//! 3. Each event closes the interval it ends and opens the one it starts
//!
//! The result depends only on the events themselves, so stored totals can
//! always be re-derived from the log.

use chrono::{DateTime, FixedOffset};

use crate::event_type::EventType;

/// An event that contributes to duration totals.
///
/// Lets aggregation run over stored events and test fixtures alike.
pub trait DurationEvent {
    /// When the event happened.
    fn timestamp(&self) -> DateTime<FixedOffset>;

    /// The kind of event.
    fn event_type(&self) -> EventType;
}

/// Computed work and break time for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationTotals {
    /// Total working time in milliseconds.
    pub work_ms: i64,
    /// Total break time in milliseconds.
    pub break_ms: i64,
}

impl DurationTotals {
    /// Working time in whole seconds, rounded half-up.
    #[must_use]
    pub const fn work_seconds(&self) -> i64 {
        round_ms_to_seconds(self.work_ms)
    }

    /// Break time in whole seconds, rounded half-up.
    #[must_use]
    pub const fn break_seconds(&self) -> i64 {
        round_ms_to_seconds(self.break_ms)
    }
}

const fn round_ms_to_seconds(ms: i64) -> i64 {
    (ms + 500).div_euclid(1000)
}

/// Recompute work and break totals from a session's events, in any order.
pub fn aggregate_durations<E: DurationEvent>(events: &[E]) -> DurationTotals {
    let mut ordered: Vec<(DateTime<FixedOffset>, EventType)> = events
        .iter()
        .map(|event| (event.timestamp(), event.event_type()))
        .collect();
    ordered.sort_by_key(|(timestamp, _)| *timestamp);

    let mut totals = DurationTotals::default();
    let mut work_start: Option<DateTime<FixedOffset>> = None;
    let mut break_start: Option<DateTime<FixedOffset>> = None;

    for (at, kind) in ordered {
        match kind {
            EventType::PunchIn | EventType::BreakEnd => {
                if let Some(start) = break_start.take() {
                    totals.break_ms += elapsed_ms(start, at);
                }
                work_start = Some(at);
            }
            EventType::BreakStart => {
                if let Some(start) = work_start.take() {
                    totals.work_ms += elapsed_ms(start, at);
                }
                break_start = Some(at);
            }
            EventType::PunchOut | EventType::LatePunchOut => {
                if let Some(start) = break_start.take() {
                    totals.break_ms += elapsed_ms(start, at);
                }
                if let Some(start) = work_start.take() {
                    totals.work_ms += elapsed_ms(start, at);
                }
            }
        }
    }

    tracing::trace!(
        work_ms = totals.work_ms,
        break_ms = totals.break_ms,
        "aggregated session durations"
    );
    totals
}

fn elapsed_ms(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> i64 {
    end.signed_duration_since(start).num_milliseconds().max(0)
}
