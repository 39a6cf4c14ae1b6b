//! Internal HTTP surface of the Attendance Engine.
//!
//! Exposes the two operations other services call directly: recomputing a
//! day summary after a punch is written, and resolving an employee's shifts
//! for a date.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{RecomputeRequest, ResolveRequest};
pub use response::{ApiError, ResolveResponse, ResolvedShiftView};
pub use state::AppState;
