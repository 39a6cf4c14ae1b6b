//! Narrow interfaces to the collaborators the engine does not own.
//!
//! Tenant and employee administration, persistence and notification
//! delivery live outside this crate. The engine reaches them only through
//! the traits below, held as `Arc<dyn ...>`.

use std::ops::Range;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Weekday};

use crate::error::EngineResult;
use crate::models::{
    DaySummary, DaySummaryKey, DayTotals, Employee, PunchEvent, Shift, Tenant, WeeklyAssignment,
};

pub mod memory;

pub use memory::MemoryStore;

/// Lists tenants and their closure policies.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Lists tenants, optionally only the active ones.
    async fn list_tenants(&self, active_only: bool) -> EngineResult<Vec<Tenant>>;

    /// Looks up a single tenant.
    async fn get_tenant(&self, tenant_id: &str) -> EngineResult<Option<Tenant>>;
}

/// Lists employees of a tenant.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Lists the active employees of `tenant_id`.
    async fn list_active_employees(&self, tenant_id: &str) -> EngineResult<Vec<Employee>>;
}

/// Read access to shifts and weekly assignments.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Assignments for one employee, week and weekday (including rest days).
    async fn list_assignments(
        &self,
        tenant_id: &str,
        employee_id: &str,
        week_start: NaiveDate,
        weekday: Weekday,
    ) -> EngineResult<Vec<WeeklyAssignment>>;

    /// Looks up a shift by id.
    async fn get_shift(&self, tenant_id: &str, shift_id: &str) -> EngineResult<Option<Shift>>;

    /// All shifts published by a tenant.
    async fn list_tenant_shifts(&self, tenant_id: &str) -> EngineResult<Vec<Shift>>;
}

/// Result of a guarded closure write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The synthetic LEAVE was written.
    Appended,
    /// A LEAVE already closes the session; nothing was written.
    LeaveExists(PunchEvent),
}

/// Append-only punch event storage.
#[async_trait]
pub trait PunchStore: Send + Sync {
    /// Appends an event.
    async fn append_event(&self, event: PunchEvent) -> EngineResult<()>;

    /// Events with timestamp in `range`, ordered by timestamp.
    async fn list_events(
        &self,
        employee_id: &str,
        tenant_id: &str,
        range: Range<NaiveDateTime>,
    ) -> EngineResult<Vec<PunchEvent>>;

    /// The earliest LEAVE with timestamp at or after `after`, if any.
    async fn find_leave_after(
        &self,
        employee_id: &str,
        tenant_id: &str,
        after: NaiveDateTime,
    ) -> EngineResult<Option<PunchEvent>>;

    /// The most recent event recorded for the employee.
    async fn latest_event(
        &self,
        employee_id: &str,
        tenant_id: &str,
    ) -> EngineResult<Option<PunchEvent>>;

    /// Appends a synthetic LEAVE unless a LEAVE at or after `opened_at`
    /// already exists.
    ///
    /// The provided implementation is check-then-write. Stores with a
    /// conditional write should override it to close the race with a live
    /// LEAVE punch.
    async fn append_closure(
        &self,
        event: PunchEvent,
        opened_at: NaiveDateTime,
    ) -> EngineResult<AppendOutcome> {
        if let Some(existing) = self
            .find_leave_after(&event.employee_id, &event.tenant_id, opened_at)
            .await?
        {
            return Ok(AppendOutcome::LeaveExists(existing));
        }
        self.append_event(event).await?;
        Ok(AppendOutcome::Appended)
    }
}

/// Day summary storage.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Creates or overwrites the figures of a summary row.
    ///
    /// New rows start `PENDING`; an existing row keeps its status.
    async fn upsert_day_summary(
        &self,
        key: &DaySummaryKey,
        totals: DayTotals,
    ) -> EngineResult<DaySummary>;

    /// Reads a summary row.
    async fn get_day_summary(&self, key: &DaySummaryKey) -> EngineResult<Option<DaySummary>>;
}

/// Fire-and-forget delivery of auto-close notices.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Tells the employee (or their supervisor) a session was closed for them.
    async fn notify_auto_close(
        &self,
        employee_id: &str,
        tenant_id: &str,
        reason: &str,
    ) -> EngineResult<()>;
}
