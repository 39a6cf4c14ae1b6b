//! Closure timing policy.
//!
//! Given the event that left a session open, the current tenant-local time,
//! the tenant's [`ClosurePolicy`] and the shifts resolved for the day the
//! session opened, decide whether to close it and at what timestamp.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{ClosurePolicy, PunchEvent};
use crate::schedule::ResolvedShift;

use super::jitter::JitterSource;

/// Why a session was closed. The display text is stored as the note of the
/// synthetic LEAVE and sent with the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "case", rename_all = "snake_case")]
pub enum ClosureReason {
    /// Opened before the shift and the pre-shift margin has passed.
    PreShift,
    /// Opened within the shift and the post-shift margin has passed.
    InShift {
        /// Offset applied to the shift end, in minutes.
        jitter_minutes: i64,
    },
    /// Opened after the shift ended and the absolute cap has passed.
    PostShift,
    /// No shift applies and the absolute cap plus margin has passed.
    NoSchedule,
}

impl std::fmt::Display for ClosureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClosureReason::PreShift => write!(f, "opened before shift, pre-shift margin exceeded"),
            ClosureReason::InShift { jitter_minutes } => write!(
                f,
                "open past shift end, post-shift margin exceeded (jitter {:+} min)",
                jitter_minutes
            ),
            ClosureReason::PostShift => write!(f, "opened after shift end, absolute cap exceeded"),
            ClosureReason::NoSchedule => write!(f, "no schedule, absolute-plus-margin exceeded"),
        }
    }
}

/// Why a session was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoActionReason {
    /// The last event was LEAVE or BREAK_START.
    SessionNotOpen,
    /// The session has not been open longer than `max_minutes`.
    WithinMaxMinutes,
    /// Shifts apply but none of their closure cases has triggered yet.
    WithinShiftTolerance,
    /// No shifts apply and `max_minutes + margin_after` has not passed.
    WithinAbsoluteMargin,
}

/// The outcome of evaluating one open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureDecision {
    /// Leave the session open.
    NoAction(NoActionReason),
    /// Write a synthetic LEAVE.
    Close {
        /// Tenant-local timestamp of the synthetic LEAVE.
        at: NaiveDateTime,
        /// Which case triggered.
        reason: ClosureReason,
        /// The shift that triggered, if any.
        shift_id: Option<String>,
    },
}

/// Checks steps 1 and 2 of the evaluation: the last event must leave a
/// session open, and it must have been open longer than `max_minutes`.
///
/// Returns the open minutes when the session needs a schedule-aware look.
pub fn check_open_session(
    last_event: &PunchEvent,
    now: NaiveDateTime,
    policy: &ClosurePolicy,
) -> Result<i64, NoActionReason> {
    if !last_event.kind.opens_session() {
        return Err(NoActionReason::SessionNotOpen);
    }
    let open_minutes = (now - last_event.timestamp).num_minutes();
    if open_minutes <= policy.max_minutes {
        return Err(NoActionReason::WithinMaxMinutes);
    }
    Ok(open_minutes)
}

/// Decides the closure for a session already past `max_minutes`.
///
/// Shifts are examined in order and the first matching case wins:
///
/// - **Pre-shift:** opened before the shift start, and `now` is more than
///   `margin_before` past the start. Closes at the start exactly.
/// - **In-shift:** opened within `[start, end]`, and `now` is more than
///   `margin_after` past the end. Closes at `end + jitter`, jitter drawn
///   from `[-margin_before, +margin_after]`.
/// - **Post-shift:** opened after the end, and open longer than
///   `max_minutes`. Closes at `opened + max_minutes`.
///
/// With no shifts, the session is closed at `now` once it has been open
/// longer than `max_minutes + margin_after`.
///
/// A computed timestamp never precedes the opening event.
///
/// # Example
///
/// ```
/// use attendance_engine::closure::{decide_closure, ClosureDecision, ClosureReason, FixedJitter};
/// use attendance_engine::models::{ClosurePolicy, PunchEvent, PunchKind};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let policy = ClosurePolicy { enabled: true, max_minutes: 480, margin_before_minutes: 15, margin_after_minutes: 30 };
/// let arrive = PunchEvent::new("acme", "emp_001", PunchKind::Arrive, at("2026-01-18 09:00"));
///
/// let decision = decide_closure(&arrive, at("2026-01-18 17:35"), &policy, &[], &FixedJitter(0));
/// assert_eq!(
///     decision,
///     ClosureDecision::Close { at: at("2026-01-18 17:35"), reason: ClosureReason::NoSchedule, shift_id: None }
/// );
/// ```
pub fn decide_closure(
    opening: &PunchEvent,
    now: NaiveDateTime,
    policy: &ClosurePolicy,
    shifts: &[ResolvedShift],
    jitter: &dyn JitterSource,
) -> ClosureDecision {
    let opened = opening.timestamp;
    let open_minutes = (now - opened).num_minutes();

    if shifts.is_empty() {
        if open_minutes > policy.max_minutes.saturating_add(policy.margin_after_minutes) {
            return ClosureDecision::Close {
                at: now,
                reason: ClosureReason::NoSchedule,
                shift_id: None,
            };
        }
        return ClosureDecision::NoAction(NoActionReason::WithinAbsoluteMargin);
    }

    for resolved in shifts {
        let window = resolved.window;
        let shift_id = Some(resolved.shift.id.clone());

        if opened < window.start {
            if exceeds(now - window.start, policy.margin_before_minutes) {
                return ClosureDecision::Close {
                    at: window.start,
                    reason: ClosureReason::PreShift,
                    shift_id,
                };
            }
        } else if opened <= window.end {
            if exceeds(now - window.end, policy.margin_after_minutes) {
                // Keep the range non-empty for a policy that skipped validation
                let jitter_minutes = jitter.offset_minutes(
                    -policy.margin_before_minutes.max(0),
                    policy.margin_after_minutes.max(0),
                );
                let at = shift_by(window.end, jitter_minutes)
                    .unwrap_or(window.end)
                    .max(opened);
                return ClosureDecision::Close {
                    at,
                    reason: ClosureReason::InShift { jitter_minutes },
                    shift_id,
                };
            }
        } else if open_minutes > policy.max_minutes {
            if let Some(at) = shift_by(opened, policy.max_minutes) {
                return ClosureDecision::Close {
                    at,
                    reason: ClosureReason::PostShift,
                    shift_id,
                };
            }
        }
    }

    ClosureDecision::NoAction(NoActionReason::WithinShiftTolerance)
}

/// True when `elapsed` is longer than `margin_minutes`. A margin too large
/// for a [`Duration`] is never exceeded.
fn exceeds(elapsed: Duration, margin_minutes: i64) -> bool {
    Duration::try_minutes(margin_minutes).is_some_and(|margin| elapsed > margin)
}

fn shift_by(at: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    Duration::try_minutes(minutes).and_then(|delta| at.checked_add_signed(delta))
}

/// Runs [`check_open_session`] then [`decide_closure`].
pub fn evaluate_session(
    last_event: &PunchEvent,
    now: NaiveDateTime,
    policy: &ClosurePolicy,
    shifts: &[ResolvedShift],
    jitter: &dyn JitterSource,
) -> ClosureDecision {
    match check_open_session(last_event, now, policy) {
        Ok(_) => decide_closure(last_event, now, policy, shifts, jitter),
        Err(reason) => ClosureDecision::NoAction(reason),
    }
}
