//! Shift model and related types.
//!
//! This module defines the [`Shift`] published by a tenant and the concrete
//! [`ShiftWindow`] it occupies on a given calendar date.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

fn default_active() -> bool {
    true
}

/// A named time-of-day window an employee is expected to work.
///
/// The window is `[start_time, end_time)`. When `end_time` is not after
/// `start_time` the shift wraps past midnight and ends on the following day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: String,
    /// The tenant that publishes this shift.
    pub tenant_id: String,
    /// Human-readable name (e.g. "Night").
    pub name: String,
    /// Local time of day the shift starts.
    pub start_time: NaiveTime,
    /// Local time of day the shift ends.
    pub end_time: NaiveTime,
    /// Length of the single break window, if any.
    #[serde(default)]
    pub break_minutes: Option<u32>,
    /// Whether the employee may start and finish flexibly around the window.
    #[serde(default)]
    pub flexible: bool,
    /// Weekdays this shift is published for at the tenant level.
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    /// Inactive shifts are never resolved.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// The concrete interval a shift occupies when worked on a specific date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// Local timestamp the shift starts.
    pub start: NaiveDateTime,
    /// Local timestamp the shift ends (may fall on the next day).
    pub end: NaiveDateTime,
}

impl ShiftWindow {
    /// Returns true if `timestamp` lies within `[start, end]`.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Length of the window in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl Shift {
    /// Returns true if the shift ends on the day after it starts.
    pub fn wraps_midnight(&self) -> bool {
        self.end_time <= self.start_time
    }

    /// Returns true if the tenant publishes this shift on `weekday`.
    pub fn is_published_on(&self, weekday: Weekday) -> bool {
        self.weekdays.contains(&weekday)
    }

    /// Computes the window this shift occupies when it starts on `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::Shift;
    /// use chrono::{NaiveDate, NaiveTime, Weekday};
    ///
    /// let night = Shift {
    ///     id: "night".to_string(),
    ///     tenant_id: "acme".to_string(),
    ///     name: "Night".to_string(),
    ///     start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
    ///     break_minutes: None,
    ///     flexible: false,
    ///     weekdays: vec![Weekday::Thu],
    ///     active: true,
    /// };
    ///
    /// let window = night.window_on(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    /// assert_eq!(window.start.to_string(), "2026-01-15 22:00:00");
    /// assert_eq!(window.end.to_string(), "2026-01-16 06:00:00");
    /// ```
    pub fn window_on(&self, date: NaiveDate) -> ShiftWindow {
        let start = date.and_time(self.start_time);
        let end_date = if self.wraps_midnight() {
            date + Duration::days(1)
        } else {
            date
        };
        ShiftWindow {
            start,
            end: end_date.and_time(self.end_time),
        }
    }

    /// Minutes the shift expects to be worked: window length minus the break.
    pub fn scheduled_minutes(&self) -> i64 {
        let window = self.window_on(NaiveDate::MIN);
        window.duration_minutes() - i64::from(self.break_minutes.unwrap_or(0))
    }

    /// Checks that the shift describes a usable window.
    pub fn validate(&self) -> EngineResult<()> {
        if self.start_time == self.end_time {
            return Err(EngineError::InvalidShift {
                shift_id: self.id.clone(),
                message: "start and end time are equal".to_string(),
            });
        }
        let window_minutes = self.window_on(NaiveDate::MIN).duration_minutes();
        if i64::from(self.break_minutes.unwrap_or(0)) >= window_minutes {
            return Err(EngineError::InvalidShift {
                shift_id: self.id.clone(),
                message: "break is not shorter than the shift".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M")
            .unwrap()
    }

    fn make_shift(start: &str, end: &str) -> Shift {
        Shift {
            id: "shift_001".to_string(),
            tenant_id: "acme".to_string(),
            name: "Test".to_string(),
            start_time: make_time(start),
            end_time: make_time(end),
            break_minutes: None,
            flexible: false,
            weekdays: vec![Weekday::Mon, Weekday::Tue],
            active: true,
        }
    }

    /// SH-001: day shift stays on its date
    #[test]
    fn test_day_shift_window() {
        let shift = make_shift("09:00", "17:00");
        let window = shift.window_on(make_date("2026-01-15"));

        assert!(!shift.wraps_midnight());
        assert_eq!(window.start, make_datetime("2026-01-15", "09:00"));
        assert_eq!(window.end, make_datetime("2026-01-15", "17:00"));
        assert_eq!(window.duration_minutes(), 480);
    }

    /// SH-002: overnight shift ends the next day
    #[test]
    fn test_overnight_shift_window() {
        let shift = make_shift("22:00", "06:00");
        let window = shift.window_on(make_date("2026-01-15"));

        assert!(shift.wraps_midnight());
        assert_eq!(window.end, make_datetime("2026-01-16", "06:00"));
        assert_eq!(window.duration_minutes(), 480);
        assert!(window.contains(make_datetime("2026-01-15", "23:50")));
        assert!(window.contains(make_datetime("2026-01-16", "06:00")));
        assert!(!window.contains(make_datetime("2026-01-15", "21:59")));
    }

    #[test]
    fn test_scheduled_minutes_subtracts_break() {
        let mut shift = make_shift("08:00", "17:00");
        shift.break_minutes = Some(60);
        assert_eq!(shift.scheduled_minutes(), 480);
    }

    #[test]
    fn test_is_published_on() {
        let shift = make_shift("09:00", "17:00");
        assert!(shift.is_published_on(Weekday::Mon));
        assert!(!shift.is_published_on(Weekday::Sun));
    }

    #[test]
    fn test_validate_rejects_zero_length_shift() {
        let shift = make_shift("09:00", "09:00");
        assert!(matches!(
            shift.validate(),
            Err(EngineError::InvalidShift { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_break_longer_than_shift() {
        let mut shift = make_shift("09:00", "10:00");
        shift.break_minutes = Some(60);
        assert!(shift.validate().is_err());

        shift.break_minutes = Some(15);
        assert!(shift.validate().is_ok());
    }

    #[test]
    fn test_shift_deserialization_defaults() {
        let json = r#"{
            "id": "day",
            "tenant_id": "acme",
            "name": "Day",
            "start_time": "09:00:00",
            "end_time": "17:00:00",
            "weekdays": ["Mon", "Fri"]
        }"#;

        let shift: Shift = serde_json::from_str(json).unwrap();
        assert!(shift.active);
        assert!(!shift.flexible);
        assert_eq!(shift.break_minutes, None);
        assert_eq!(shift.weekdays, vec![Weekday::Mon, Weekday::Fri]);
    }
}
