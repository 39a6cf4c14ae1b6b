//! Punch-stream aggregation into day summaries.
//!
//! [`summarize_day`] is the pure fold over one day's events;
//! [`PunchAggregator`] wraps it with the store reads and the upsert. The
//! aggregator is called by the live punch path and by the closure sweeper
//! after it writes a synthetic LEAVE.

mod aggregator;
mod summarize;

pub use aggregator::PunchAggregator;
pub use summarize::{DayBoundary, day_bounds, open_at_day_end, summarize_day, summarize_day_with};
