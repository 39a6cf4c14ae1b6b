//! Daily attendance summary models.
//!
//! A [`DaySummary`] is derived from the punch events of one employee on one
//! tenant-local calendar date and can always be recomputed from them.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Review status of a day summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryStatus {
    /// Not yet reviewed by a supervisor.
    #[default]
    Pending,
    /// Reviewed by a supervisor.
    Reviewed,
}

/// Identifies one summary row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DaySummaryKey {
    /// The tenant the employee belongs to.
    pub tenant_id: String,
    /// The employee.
    pub employee_id: String,
    /// Tenant-local calendar date.
    pub date: NaiveDate,
}

impl DaySummaryKey {
    /// Creates a key.
    pub fn new(tenant_id: impl Into<String>, employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            employee_id: employee_id.into(),
            date,
        }
    }
}

/// The figures derived from one day's punch events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayTotals {
    /// Timestamp of the first ARRIVE of the day.
    pub first_arrive: Option<NaiveDateTime>,
    /// Timestamp of the last LEAVE that closed a session, or of the first
    /// LEAVE of the day when none did.
    pub last_leave: Option<NaiveDateTime>,
    /// Total worked minutes.
    pub total_minutes: i64,
    /// Minutes worked beyond the standard day.
    pub overtime_minutes: i64,
    /// True when the total includes a provisional, still-open session.
    pub in_progress: bool,
}

/// One row per (employee, tenant, calendar date).
///
/// # Example
///
/// ```
/// use attendance_engine::models::{DaySummary, DaySummaryKey, DayTotals, SummaryStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let key = DaySummaryKey::new("acme", "emp_001", NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
/// let totals = DayTotals { total_minutes: 540, overtime_minutes: 60, ..Default::default() };
/// let summary = DaySummary::from_totals(key, totals, SummaryStatus::Pending);
///
/// assert_eq!(summary.worked_hours(), Decimal::new(9, 0));
/// assert_eq!(summary.overtime_hours(), Decimal::new(1, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// The tenant the employee belongs to.
    pub tenant_id: String,
    /// The employee.
    pub employee_id: String,
    /// Tenant-local calendar date.
    pub date: NaiveDate,
    /// Timestamp of the first ARRIVE of the day.
    pub first_arrive: Option<NaiveDateTime>,
    /// Timestamp of the last LEAVE that closed a session, or of the first
    /// LEAVE of the day when none did.
    pub last_leave: Option<NaiveDateTime>,
    /// Total worked minutes.
    pub total_minutes: i64,
    /// Minutes worked beyond the standard day.
    pub overtime_minutes: i64,
    /// True when the total includes a provisional, still-open session.
    #[serde(default)]
    pub in_progress: bool,
    /// Review status.
    #[serde(default)]
    pub status: SummaryStatus,
}

impl DaySummary {
    /// Builds a summary row from a key and freshly derived totals.
    pub fn from_totals(key: DaySummaryKey, totals: DayTotals, status: SummaryStatus) -> Self {
        Self {
            tenant_id: key.tenant_id,
            employee_id: key.employee_id,
            date: key.date,
            first_arrive: totals.first_arrive,
            last_leave: totals.last_leave,
            total_minutes: totals.total_minutes,
            overtime_minutes: totals.overtime_minutes,
            in_progress: totals.in_progress,
            status,
        }
    }

    /// Returns the key this row is stored under.
    pub fn key(&self) -> DaySummaryKey {
        DaySummaryKey::new(self.tenant_id.clone(), self.employee_id.clone(), self.date)
    }

    /// Total worked time in hours.
    pub fn worked_hours(&self) -> Decimal {
        minutes_to_hours(self.total_minutes)
    }

    /// Overtime in hours.
    pub fn overtime_hours(&self) -> Decimal {
        minutes_to_hours(self.overtime_minutes)
    }
}

fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::new(minutes, 0) / Decimal::new(60, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key() -> DaySummaryKey {
        DaySummaryKey::new("acme", "emp_001", NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
    }

    #[test]
    fn test_from_totals_copies_fields() {
        let arrive = NaiveDateTime::parse_from_str("2026-01-15 08:00", "%Y-%m-%d %H:%M").unwrap();
        let totals = DayTotals {
            first_arrive: Some(arrive),
            last_leave: None,
            total_minutes: 90,
            overtime_minutes: 0,
            in_progress: true,
        };

        let summary = DaySummary::from_totals(make_key(), totals, SummaryStatus::Reviewed);
        assert_eq!(summary.first_arrive, Some(arrive));
        assert!(summary.in_progress);
        assert_eq!(summary.status, SummaryStatus::Reviewed);
        assert_eq!(summary.key(), make_key());
    }

    #[test]
    fn test_fractional_hours() {
        let totals = DayTotals {
            total_minutes: 450,
            ..Default::default()
        };
        let summary = DaySummary::from_totals(make_key(), totals, SummaryStatus::Pending);
        assert_eq!(summary.worked_hours(), Decimal::new(75, 1)); // 7.5
        assert_eq!(summary.overtime_hours(), Decimal::ZERO);
    }

    #[test]
    fn test_status_defaults_to_pending() {
        assert_eq!(SummaryStatus::default(), SummaryStatus::Pending);
        assert_eq!(
            serde_json::to_string(&SummaryStatus::Reviewed).unwrap(),
            "\"REVIEWED\""
        );
    }
}
