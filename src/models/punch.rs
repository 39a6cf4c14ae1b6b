//! Punch event model.
//!
//! A [`PunchEvent`] is an immutable, timestamped clock event. Events are
//! append-only; the engine never mutates or deletes them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of clock event an employee (or the system) recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchKind {
    /// Start of the working day.
    Arrive,
    /// End of the working day.
    Leave,
    /// Start of a break; suspends the session without closing it.
    BreakStart,
    /// End of a break; resumes the session.
    BreakEnd,
}

impl PunchKind {
    /// Returns true for events that leave a live session open behind them.
    pub fn opens_session(self) -> bool {
        matches!(self, PunchKind::Arrive | PunchKind::BreakEnd)
    }
}

impl std::fmt::Display for PunchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PunchKind::Arrive => write!(f, "ARRIVE"),
            PunchKind::Leave => write!(f, "LEAVE"),
            PunchKind::BreakStart => write!(f, "BREAK_START"),
            PunchKind::BreakEnd => write!(f, "BREAK_END"),
        }
    }
}

/// Who produced a punch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchOrigin {
    /// Recorded by the employee through the punch-intake service.
    Employee,
    /// Synthesized by the closure sweeper.
    SystemAutoClose,
}

/// An immutable, timestamped clock event.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{PunchEvent, PunchKind, PunchOrigin};
/// use chrono::NaiveDateTime;
///
/// let at = NaiveDateTime::parse_from_str("2026-01-15 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let event = PunchEvent::new("acme", "emp_001", PunchKind::Arrive, at);
///
/// assert_eq!(event.origin, PunchOrigin::Employee);
/// assert!(event.kind.opens_session());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    /// Unique identifier for the event.
    pub id: Uuid,
    /// The tenant the employee belongs to.
    pub tenant_id: String,
    /// The employee who punched.
    pub employee_id: String,
    /// What kind of event this is.
    pub kind: PunchKind,
    /// Tenant-local wall-clock time of the event.
    pub timestamp: NaiveDateTime,
    /// Who produced the event.
    pub origin: PunchOrigin,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl PunchEvent {
    /// Creates an employee-originated event with a fresh id.
    pub fn new(
        tenant_id: impl Into<String>,
        employee_id: impl Into<String>,
        kind: PunchKind,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            employee_id: employee_id.into(),
            kind,
            timestamp,
            origin: PunchOrigin::Employee,
            note: None,
        }
    }

    /// Creates the synthetic LEAVE written when the sweeper closes a session.
    pub fn auto_close(
        tenant_id: impl Into<String>,
        employee_id: impl Into<String>,
        timestamp: NaiveDateTime,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            origin: PunchOrigin::SystemAutoClose,
            note: Some(reason.into()),
            ..Self::new(tenant_id, employee_id, PunchKind::Leave, timestamp)
        }
    }

    /// Returns true if this event was synthesized by the sweeper.
    pub fn is_auto_close(&self) -> bool {
        self.origin == PunchOrigin::SystemAutoClose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_opens_session() {
        assert!(PunchKind::Arrive.opens_session());
        assert!(PunchKind::BreakEnd.opens_session());
        assert!(!PunchKind::Leave.opens_session());
        assert!(!PunchKind::BreakStart.opens_session());
    }

    #[test]
    fn test_auto_close_event() {
        let event = PunchEvent::auto_close(
            "acme",
            "emp_001",
            make_datetime("2026-01-15 17:00"),
            "no schedule, absolute-plus-margin exceeded",
        );

        assert_eq!(event.kind, PunchKind::Leave);
        assert!(event.is_auto_close());
        assert_eq!(
            event.note.as_deref(),
            Some("no schedule, absolute-plus-margin exceeded")
        );
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&PunchKind::BreakStart).unwrap(),
            "\"BREAK_START\""
        );
        assert_eq!(
            serde_json::to_string(&PunchOrigin::SystemAutoClose).unwrap(),
            "\"SYSTEM_AUTO_CLOSE\""
        );
    }

    #[test]
    fn test_kind_display_matches_wire_name() {
        assert_eq!(PunchKind::BreakEnd.to_string(), "BREAK_END");
        assert_eq!(PunchKind::Arrive.to_string(), "ARRIVE");
    }
}
