//! Automatic closure of forgotten sessions.
//!
//! [`decide_closure`] holds the timing policy as pure functions.
//! [`ClosureSweeper`] runs it periodically against the stores, writing a
//! synthetic LEAVE and refreshing the affected day summaries.

mod decision;
mod jitter;
mod sweeper;

pub use decision::{
    ClosureDecision, ClosureReason, NoActionReason, check_open_session, decide_closure,
    evaluate_session,
};
pub use jitter::{FixedJitter, JitterSource, RandomJitter, SeededJitter};
pub use sweeper::{ClosureSweeper, EmployeeOutcome, SweepReport, SweeperServices};
