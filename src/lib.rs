//! Attendance Engine for multi-tenant time tracking
//!
//! This crate resolves which shifts apply to an employee on a date, folds
//! the append-only punch stream into per-day summaries, and periodically
//! closes sessions that employees forgot to close.
//!
//! The three pieces share one [`schedule::ScheduleResolver`] and one
//! [`aggregation::PunchAggregator`]; storage, directories and notification
//! delivery are reached through the traits in [`store`].

#![warn(missing_docs)]

pub mod aggregation;
pub mod api;
pub mod clock;
pub mod closure;
pub mod config;
pub mod error;
pub mod models;
pub mod schedule;
pub mod store;
