//! Folding one day's punch events into worked-time totals.
//!
//! Only ARRIVE→LEAVE spans are summed. Under [`BreakPolicy::Include`] a
//! break does not interrupt the span; under [`BreakPolicy::Exclude`] the
//! BREAK_START→BREAK_END interval is left out.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::config::{AggregationConfig, BreakPolicy};
use crate::error::EngineError;
use crate::models::{DayTotals, PunchEvent, PunchKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Closed,
    Open(NaiveDateTime),
    OnBreak,
}

/// Returns the `[start, end)` bounds of a calendar day.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// How a session crosses the edges of the summarized day.
///
/// Both fields come from outside the day's own events: the previous day's
/// stream and the first LEAVE after a session left open at midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayBoundary {
    /// Opening time of a session still open when the day starts. The day
    /// counts it from midnight.
    pub carried_in: Option<NaiveDateTime>,
    /// The LEAVE closing a session still open at the end of the day's
    /// events. When set, the session counts up to it (capped at the end of
    /// the day) instead of provisionally up to `now`.
    pub closing_leave: Option<NaiveDateTime>,
}

/// Computes the totals for one employee's events on `day`.
///
/// `events` must be the day's events ordered by timestamp. Events outside
/// the day or out of order are logged and skipped. A LEAVE with no open
/// session is ignored, so only the first LEAVE after an opening event counts.
/// If a session is still open at the end of the stream, the time up to
/// `now` (capped at the end of the day) is added as a provisional figure
/// and `in_progress` is set.
///
/// # Example
///
/// ```
/// use attendance_engine::aggregation::summarize_day;
/// use attendance_engine::config::AggregationConfig;
/// use attendance_engine::models::{PunchEvent, PunchKind};
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let events = vec![
///     PunchEvent::new("acme", "emp_001", PunchKind::Arrive, at("2026-01-15 08:00")),
///     PunchEvent::new("acme", "emp_001", PunchKind::BreakStart, at("2026-01-15 12:00")),
///     PunchEvent::new("acme", "emp_001", PunchKind::BreakEnd, at("2026-01-15 12:30")),
///     PunchEvent::new("acme", "emp_001", PunchKind::Leave, at("2026-01-15 17:00")),
/// ];
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let totals = summarize_day(&events, day, at("2026-01-15 20:00"), AggregationConfig::default());
/// assert_eq!(totals.total_minutes, 540);
/// assert_eq!(totals.overtime_minutes, 60);
/// ```
pub fn summarize_day(
    events: &[PunchEvent],
    day: NaiveDate,
    now: NaiveDateTime,
    config: AggregationConfig,
) -> DayTotals {
    summarize_day_with(events, day, now, config, DayBoundary::default())
}

/// Like [`summarize_day`], but with sessions crossing midnight accounted
/// for through `boundary`.
///
/// # Example
///
/// ```
/// use attendance_engine::aggregation::{DayBoundary, summarize_day_with};
/// use attendance_engine::config::AggregationConfig;
/// use attendance_engine::models::{PunchEvent, PunchKind};
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let leave = PunchEvent::new("acme", "emp_001", PunchKind::Leave, at("2026-01-15 06:00"));
/// let boundary = DayBoundary {
///     carried_in: Some(at("2026-01-14 22:00")),
///     closing_leave: None,
/// };
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let totals = summarize_day_with(&[leave], day, at("2026-01-15 08:00"), AggregationConfig::default(), boundary);
/// assert_eq!(totals.total_minutes, 360);
/// assert_eq!(totals.last_leave, Some(at("2026-01-15 06:00")));
/// ```
pub fn summarize_day_with(
    events: &[PunchEvent],
    day: NaiveDate,
    now: NaiveDateTime,
    config: AggregationConfig,
    boundary: DayBoundary,
) -> DayTotals {
    let (_, day_end) = day_bounds(day);
    let (mut totals, session) = fold_day(events, day, config, boundary.carried_in);

    if let Session::Open(since) = session {
        match boundary.closing_leave {
            Some(leave) => {
                let until = leave.min(day_end);
                if until > since {
                    totals.total_minutes += minutes_between(since, until);
                }
            }
            None => {
                let until = now.min(day_end);
                if until > since {
                    totals.total_minutes += minutes_between(since, until);
                    totals.in_progress = true;
                }
            }
        }
    }

    totals.overtime_minutes = (totals.total_minutes - config.standard_daily_minutes).max(0);
    totals
}

/// Returns when the session still open at the end of `day`'s events
/// started counting, or `None` if the day ends with no open session.
///
/// A session carried in from the previous day counts from midnight.
pub fn open_at_day_end(
    events: &[PunchEvent],
    day: NaiveDate,
    config: AggregationConfig,
    carried_in: Option<NaiveDateTime>,
) -> Option<NaiveDateTime> {
    match fold_day(events, day, config, carried_in).1 {
        Session::Open(since) => Some(since),
        _ => None,
    }
}

fn fold_day(
    events: &[PunchEvent],
    day: NaiveDate,
    config: AggregationConfig,
    carried_in: Option<NaiveDateTime>,
) -> (DayTotals, Session) {
    let (day_start, day_end) = day_bounds(day);
    let mut totals = DayTotals::default();
    let mut session = match carried_in {
        Some(_) => Session::Open(day_start),
        None => Session::Closed,
    };
    let mut last_seen: Option<NaiveDateTime> = None;

    for event in events {
        if event.timestamp < day_start || event.timestamp >= day_end {
            log_skipped(event, "timestamp outside the summarized day");
            continue;
        }
        if last_seen.is_some_and(|prev| event.timestamp < prev) {
            log_skipped(event, "event out of timestamp order");
            continue;
        }
        last_seen = Some(event.timestamp);

        session = match (event.kind, session) {
            (PunchKind::Arrive, Session::Open(since)) => {
                warn!(
                    employee_id = %event.employee_id,
                    open_since = %since,
                    at = %event.timestamp,
                    "ARRIVE while a session is already open, keeping the earliest"
                );
                Session::Open(since)
            }
            (PunchKind::Arrive, _) => {
                totals.first_arrive.get_or_insert(event.timestamp);
                Session::Open(event.timestamp)
            }
            (PunchKind::BreakStart, Session::Open(since))
                if config.break_policy == BreakPolicy::Exclude =>
            {
                totals.total_minutes += minutes_between(since, event.timestamp);
                Session::OnBreak
            }
            (PunchKind::BreakStart, state) => state,
            (PunchKind::BreakEnd, Session::Open(since)) => Session::Open(since),
            (PunchKind::BreakEnd, _) => Session::Open(event.timestamp),
            (PunchKind::Leave, Session::Open(since)) => {
                totals.total_minutes += minutes_between(since, event.timestamp);
                totals.last_leave = Some(event.timestamp);
                Session::Closed
            }
            (PunchKind::Leave, Session::OnBreak) => {
                totals.last_leave = Some(event.timestamp);
                Session::Closed
            }
            (PunchKind::Leave, Session::Closed) => {
                debug!(
                    employee_id = %event.employee_id,
                    at = %event.timestamp,
                    "LEAVE with no open session adds no time"
                );
                // Still the day's last LEAVE if nothing else closed a session
                totals.last_leave.get_or_insert(event.timestamp);
                Session::Closed
            }
        };
    }

    (totals, session)
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_minutes()
}

fn log_skipped(event: &PunchEvent, reason: &str) {
    let error = EngineError::Aggregation {
        employee_id: event.employee_id.clone(),
        message: format!("skipped {} at {}: {}", event.kind, event.timestamp, reason),
    };
    warn!(event_id = %event.id, error = %error, "Skipping punch event");
}
