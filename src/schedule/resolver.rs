//! Shift resolution for one employee on one calendar date.
//!
//! Two tiers are consulted, highest priority first:
//!
//! 1. Weekly assignments for (employee, Monday of the week, weekday). Any
//!    assignment row, including an explicit rest day, suppresses tier 2.
//! 2. The tenant's active shifts published for that weekday.
//!
//! If neither tier yields anything the date is a rest day.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{Shift, ShiftWindow};
use crate::store::ScheduleStore;

/// A shift that applies to an employee on a specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedShift {
    /// The shift definition.
    pub shift: Shift,
    /// True if it came from a weekly assignment rather than tenant defaults.
    pub is_override: bool,
    /// The concrete window the shift occupies on the resolved date.
    pub window: ShiftWindow,
}

/// Returns the Monday of the week containing `date`.
///
/// # Example
///
/// ```
/// use attendance_engine::schedule::week_start;
/// use chrono::NaiveDate;
///
/// // 2026-01-18 is a Sunday
/// let sunday = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
/// assert_eq!(week_start(sunday), NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
/// ```
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Resolves which shifts apply to an employee on a date.
///
/// One resolver is shared by the live aggregation path and the closure
/// sweeper so both see the same schedule.
#[derive(Clone)]
pub struct ScheduleResolver {
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleResolver {
    /// Creates a resolver reading from `store`.
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Returns the shifts that apply to `employee_id` on `date`, ordered by
    /// start time.
    ///
    /// For sessions, pass the date the session *opened* on: a session opened
    /// at 23:50 is governed by that day's shift even when evaluated after
    /// midnight.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Resolution`] if the store fails or an
    /// assignment references a shift that does not exist, is inactive or
    /// fails [`Shift::validate`]. Invalid tenant-default shifts are logged
    /// and left out.
    pub async fn resolve(
        &self,
        tenant_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Vec<ResolvedShift>> {
        let monday = week_start(date);
        let weekday = date.weekday();

        let assignments = self
            .store
            .list_assignments(tenant_id, employee_id, monday, weekday)
            .await
            .map_err(|e| resolution_error(employee_id, date, e.to_string()))?;

        if !assignments.is_empty() {
            let mut resolved = Vec::new();
            for shift_id in assignments.iter().filter_map(|a| a.shift_id.as_deref()) {
                let shift = self
                    .store
                    .get_shift(tenant_id, shift_id)
                    .await
                    .map_err(|e| resolution_error(employee_id, date, e.to_string()))?
                    .filter(|s| s.active)
                    .ok_or_else(|| {
                        resolution_error(
                            employee_id,
                            date,
                            format!("assigned shift '{}' not found or inactive", shift_id),
                        )
                    })?;
                shift
                    .validate()
                    .map_err(|e| resolution_error(employee_id, date, e.to_string()))?;
                resolved.push(ResolvedShift {
                    window: shift.window_on(date),
                    shift,
                    is_override: true,
                });
            }
            sort_by_start(&mut resolved);

            debug!(
                tenant_id,
                employee_id,
                %date,
                shifts = resolved.len(),
                "Resolved schedule from weekly assignments"
            );
            return Ok(resolved);
        }

        let mut resolved: Vec<ResolvedShift> = self
            .store
            .list_tenant_shifts(tenant_id)
            .await
            .map_err(|e| resolution_error(employee_id, date, e.to_string()))?
            .into_iter()
            .filter(|s| s.active && s.is_published_on(weekday))
            .filter(|s| match s.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(tenant_id, shift_id = %s.id, error = %e, "Ignoring invalid shift");
                    false
                }
            })
            .map(|shift| ResolvedShift {
                window: shift.window_on(date),
                shift,
                is_override: false,
            })
            .collect();
        sort_by_start(&mut resolved);

        debug!(
            tenant_id,
            employee_id,
            %date,
            shifts = resolved.len(),
            "Resolved schedule from tenant defaults"
        );
        Ok(resolved)
    }

    /// Like [`resolve`](Self::resolve), but a resolution failure is logged
    /// and treated as a rest day.
    pub async fn resolve_or_rest_day(
        &self,
        tenant_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> Vec<ResolvedShift> {
        match self.resolve(tenant_id, employee_id, date).await {
            Ok(shifts) => shifts,
            Err(e) => {
                warn!(
                    tenant_id,
                    employee_id,
                    %date,
                    error = %e,
                    "Schedule resolution failed, treating as no schedule"
                );
                Vec::new()
            }
        }
    }
}

fn sort_by_start(shifts: &mut [ResolvedShift]) {
    shifts.sort_by_key(|r| r.window.start);
}

fn resolution_error(employee_id: &str, date: NaiveDate, message: String) -> EngineError {
    EngineError::Resolution {
        employee_id: employee_id.to_string(),
        date,
        message,
    }
}
