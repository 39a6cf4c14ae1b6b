//! Weekly schedule override model.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// An explicit override binding one employee to one shift for one weekday
/// of one concrete calendar week.
///
/// A `shift_id` of `None` means the employee is explicitly off that day.
///
/// # Example
///
/// ```
/// use attendance_engine::models::WeeklyAssignment;
/// use chrono::{NaiveDate, Weekday};
///
/// let day_off = WeeklyAssignment {
///     tenant_id: "acme".to_string(),
///     employee_id: "emp_001".to_string(),
///     week_start: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
///     weekday: Weekday::Wed,
///     shift_id: None,
/// };
/// assert!(day_off.is_rest_day());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAssignment {
    /// The tenant the assignment belongs to.
    pub tenant_id: String,
    /// The employee being scheduled.
    pub employee_id: String,
    /// Monday of the week the assignment applies to.
    pub week_start: NaiveDate,
    /// The weekday within that week.
    pub weekday: Weekday,
    /// The assigned shift, or `None` for an explicit rest day.
    #[serde(default)]
    pub shift_id: Option<String>,
}

impl WeeklyAssignment {
    /// Returns true if this assignment marks the day as explicitly off.
    pub fn is_rest_day(&self) -> bool {
        self.shift_id.is_none()
    }
}
