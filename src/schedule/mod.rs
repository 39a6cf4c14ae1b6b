//! Schedule resolution.
//!
//! Decides which shifts an employee is expected to work on a date, from
//! weekly overrides and tenant defaults.

mod resolver;

pub use resolver::{ResolvedShift, ScheduleResolver, week_start};
