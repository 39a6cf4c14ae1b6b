//! Core data models for the Attendance Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod assignment;
mod day_summary;
mod punch;
mod shift;
mod tenant;

pub use assignment::WeeklyAssignment;
pub use day_summary::{DaySummary, DaySummaryKey, DayTotals, SummaryStatus};
pub use punch::{PunchEvent, PunchKind, PunchOrigin};
pub use shift::{Shift, ShiftWindow};
pub use tenant::{ClosurePolicy, Employee, Tenant, TenantTimezone};
