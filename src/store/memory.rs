//! In-process implementation of every store interface.
//!
//! Used by tests, benches and embedders that keep attendance data in
//! memory. All collections sit behind one lock so the guarded closure write
//! is atomic.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Weekday};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    DaySummary, DaySummaryKey, DayTotals, Employee, PunchEvent, PunchKind, Shift, SummaryStatus,
    Tenant, WeeklyAssignment,
};

use super::{
    AppendOutcome, EmployeeDirectory, NotificationSink, PunchStore, ScheduleStore, SummaryStore,
    TenantDirectory,
};

/// A delivered auto-close notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    /// The employee notified.
    pub employee_id: String,
    /// The employee's tenant.
    pub tenant_id: String,
    /// The closure reason text.
    pub reason: String,
}

#[derive(Debug, Default)]
struct Inner {
    tenants: Vec<Tenant>,
    employees: Vec<Employee>,
    shifts: Vec<Shift>,
    assignments: Vec<WeeklyAssignment>,
    events: Vec<PunchEvent>,
    summaries: HashMap<DaySummaryKey, DaySummary>,
    notifications: Vec<SentNotification>,
    failing_employees: HashSet<String>,
    fail_notifications: bool,
}

/// In-memory tenant/employee directory, schedule, punch and summary store
/// and notification sink.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds a tenant.
    pub fn insert_tenant(&self, tenant: Tenant) {
        self.write().tenants.push(tenant);
    }

    /// Adds an employee.
    pub fn insert_employee(&self, employee: Employee) {
        self.write().employees.push(employee);
    }

    /// Adds a shift.
    pub fn insert_shift(&self, shift: Shift) {
        self.write().shifts.push(shift);
    }

    /// Adds a weekly assignment.
    pub fn insert_assignment(&self, assignment: WeeklyAssignment) {
        self.write().assignments.push(assignment);
    }

    /// Records a punch event without any guard.
    pub fn insert_event(&self, event: PunchEvent) {
        self.write().events.push(event);
    }

    /// All events stored for an employee, in insertion order.
    pub fn events_for(&self, employee_id: &str) -> Vec<PunchEvent> {
        self.read()
            .events
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .cloned()
            .collect()
    }

    /// Notifications delivered so far.
    pub fn notifications(&self) -> Vec<SentNotification> {
        self.read().notifications.clone()
    }

    /// Sets the review status of a stored summary.
    pub fn set_summary_status(&self, key: &DaySummaryKey, status: SummaryStatus) {
        if let Some(summary) = self.write().summaries.get_mut(key) {
            summary.status = status;
        }
    }

    /// Makes punch reads for `employee_id` fail, to exercise error isolation.
    pub fn fail_punch_reads_for(&self, employee_id: impl Into<String>) {
        self.write().failing_employees.insert(employee_id.into());
    }

    /// Makes every notification call fail.
    pub fn fail_notifications(&self, fail: bool) {
        self.write().fail_notifications = fail;
    }

    fn check_readable(inner: &Inner, employee_id: &str) -> EngineResult<()> {
        if inner.failing_employees.contains(employee_id) {
            return Err(EngineError::store(
                "read_events",
                format!("injected failure for employee '{}'", employee_id),
            ));
        }
        Ok(())
    }

    fn first_leave_after<'a>(
        inner: &'a Inner,
        employee_id: &str,
        tenant_id: &str,
        after: NaiveDateTime,
    ) -> Option<&'a PunchEvent> {
        inner
            .events
            .iter()
            .filter(|e| {
                e.employee_id == employee_id
                    && e.tenant_id == tenant_id
                    && e.kind == PunchKind::Leave
                    && e.timestamp >= after
            })
            .min_by_key(|e| e.timestamp)
    }
}

#[async_trait]
impl TenantDirectory for MemoryStore {
    async fn list_tenants(&self, active_only: bool) -> EngineResult<Vec<Tenant>> {
        Ok(self
            .read()
            .tenants
            .iter()
            .filter(|t| !active_only || t.active)
            .cloned()
            .collect())
    }

    async fn get_tenant(&self, tenant_id: &str) -> EngineResult<Option<Tenant>> {
        Ok(self.read().tenants.iter().find(|t| t.id == tenant_id).cloned())
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn list_active_employees(&self, tenant_id: &str) -> EngineResult<Vec<Employee>> {
        Ok(self
            .read()
            .employees
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn list_assignments(
        &self,
        tenant_id: &str,
        employee_id: &str,
        week_start: NaiveDate,
        weekday: Weekday,
    ) -> EngineResult<Vec<WeeklyAssignment>> {
        Ok(self
            .read()
            .assignments
            .iter()
            .filter(|a| {
                a.tenant_id == tenant_id
                    && a.employee_id == employee_id
                    && a.week_start == week_start
                    && a.weekday == weekday
            })
            .cloned()
            .collect())
    }

    async fn get_shift(&self, tenant_id: &str, shift_id: &str) -> EngineResult<Option<Shift>> {
        Ok(self
            .read()
            .shifts
            .iter()
            .find(|s| s.tenant_id == tenant_id && s.id == shift_id)
            .cloned())
    }

    async fn list_tenant_shifts(&self, tenant_id: &str) -> EngineResult<Vec<Shift>> {
        Ok(self
            .read()
            .shifts
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PunchStore for MemoryStore {
    async fn append_event(&self, event: PunchEvent) -> EngineResult<()> {
        self.write().events.push(event);
        Ok(())
    }

    async fn list_events(
        &self,
        employee_id: &str,
        tenant_id: &str,
        range: Range<NaiveDateTime>,
    ) -> EngineResult<Vec<PunchEvent>> {
        let inner = self.read();
        Self::check_readable(&inner, employee_id)?;

        let mut events: Vec<PunchEvent> = inner
            .events
            .iter()
            .filter(|e| {
                e.employee_id == employee_id
                    && e.tenant_id == tenant_id
                    && range.contains(&e.timestamp)
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    async fn find_leave_after(
        &self,
        employee_id: &str,
        tenant_id: &str,
        after: NaiveDateTime,
    ) -> EngineResult<Option<PunchEvent>> {
        let inner = self.read();
        Self::check_readable(&inner, employee_id)?;
        Ok(Self::first_leave_after(&inner, employee_id, tenant_id, after).cloned())
    }

    async fn latest_event(
        &self,
        employee_id: &str,
        tenant_id: &str,
    ) -> EngineResult<Option<PunchEvent>> {
        let inner = self.read();
        Self::check_readable(&inner, employee_id)?;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.employee_id == employee_id && e.tenant_id == tenant_id)
            .max_by_key(|e| e.timestamp)
            .cloned())
    }

    async fn append_closure(
        &self,
        event: PunchEvent,
        opened_at: NaiveDateTime,
    ) -> EngineResult<AppendOutcome> {
        let mut inner = self.write();
        if let Some(existing) =
            Self::first_leave_after(&inner, &event.employee_id, &event.tenant_id, opened_at)
        {
            return Ok(AppendOutcome::LeaveExists(existing.clone()));
        }
        inner.events.push(event);
        Ok(AppendOutcome::Appended)
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn upsert_day_summary(
        &self,
        key: &DaySummaryKey,
        totals: DayTotals,
    ) -> EngineResult<DaySummary> {
        let mut inner = self.write();
        let status = inner
            .summaries
            .get(key)
            .map(|s| s.status)
            .unwrap_or_default();
        let summary = DaySummary::from_totals(key.clone(), totals, status);
        inner.summaries.insert(key.clone(), summary.clone());
        Ok(summary)
    }

    async fn get_day_summary(&self, key: &DaySummaryKey) -> EngineResult<Option<DaySummary>> {
        Ok(self.read().summaries.get(key).cloned())
    }
}

#[async_trait]
impl NotificationSink for MemoryStore {
    async fn notify_auto_close(
        &self,
        employee_id: &str,
        tenant_id: &str,
        reason: &str,
    ) -> EngineResult<()> {
        let mut inner = self.write();
        if inner.fail_notifications {
            return Err(EngineError::Notification {
                employee_id: employee_id.to_string(),
                message: "notification sink unavailable".to_string(),
            });
        }
        inner.notifications.push(SentNotification {
            employee_id: employee_id.to_string(),
            tenant_id: tenant_id.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn punch(kind: PunchKind, at: &str) -> PunchEvent {
        PunchEvent::new("acme", "emp_001", kind, make_datetime(at))
    }

    #[tokio::test]
    async fn test_list_events_is_ordered_and_range_bounded() {
        let store = MemoryStore::new();
        store.insert_event(punch(PunchKind::Leave, "2026-01-15 17:00"));
        store.insert_event(punch(PunchKind::Arrive, "2026-01-15 08:00"));
        store.insert_event(punch(PunchKind::Arrive, "2026-01-16 08:00"));

        let events = store
            .list_events(
                "emp_001",
                "acme",
                make_datetime("2026-01-15 00:00")..make_datetime("2026-01-16 00:00"),
            )
            .await
            .unwrap();

        let kinds: Vec<PunchKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![PunchKind::Arrive, PunchKind::Leave]);
    }

    #[tokio::test]
    async fn test_latest_event() {
        let store = MemoryStore::new();
        store.insert_event(punch(PunchKind::Arrive, "2026-01-15 08:00"));
        store.insert_event(punch(PunchKind::BreakStart, "2026-01-15 12:00"));

        let latest = store.latest_event("emp_001", "acme").await.unwrap().unwrap();
        assert_eq!(latest.kind, PunchKind::BreakStart);
        assert!(store.latest_event("emp_999", "acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_closure_refuses_second_leave() {
        let store = MemoryStore::new();
        let opened_at = make_datetime("2026-01-15 08:00");
        store.insert_event(punch(PunchKind::Arrive, "2026-01-15 08:00"));

        let first = PunchEvent::auto_close("acme", "emp_001", make_datetime("2026-01-15 17:00"), "x");
        let second = PunchEvent::auto_close("acme", "emp_001", make_datetime("2026-01-15 17:05"), "x");

        assert_eq!(
            store.append_closure(first, opened_at).await.unwrap(),
            AppendOutcome::Appended
        );
        assert!(matches!(
            store.append_closure(second, opened_at).await.unwrap(),
            AppendOutcome::LeaveExists(_)
        ));
        assert_eq!(store.events_for("emp_001").len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_preserves_status() {
        let store = MemoryStore::new();
        let key = DaySummaryKey::new("acme", "emp_001", NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());

        let created = store.upsert_day_summary(&key, DayTotals::default()).await.unwrap();
        assert_eq!(created.status, SummaryStatus::Pending);

        store.set_summary_status(&key, SummaryStatus::Reviewed);
        let totals = DayTotals {
            total_minutes: 480,
            ..Default::default()
        };
        let updated = store.upsert_day_summary(&key, totals).await.unwrap();
        assert_eq!(updated.status, SummaryStatus::Reviewed);
        assert_eq!(updated.total_minutes, 480);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::new();
        store.fail_punch_reads_for("emp_001");
        assert!(store.latest_event("emp_001", "acme").await.is_err());

        store.fail_notifications(true);
        assert!(store.notify_auto_close("emp_002", "acme", "r").await.is_err());
        assert!(store.notifications().is_empty());
    }
}
