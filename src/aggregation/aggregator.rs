//! Recomputation of stored day summaries.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::clock::Clock;
use crate::config::AggregationConfig;
use crate::error::EngineResult;
use crate::models::{DaySummary, DaySummaryKey, Tenant};
use crate::store::{PunchStore, SummaryStore};

use super::summarize::{DayBoundary, day_bounds, open_at_day_end, summarize_day_with};

/// Derives and stores [`DaySummary`] rows from the punch stream.
///
/// Recomputation always starts from the events, never from the stored row,
/// so it is idempotent and safe to run concurrently for the same key: the
/// last writer wins with a freshly derived value.
pub struct PunchAggregator {
    punches: Arc<dyn PunchStore>,
    summaries: Arc<dyn SummaryStore>,
    clock: Arc<dyn Clock>,
    config: AggregationConfig,
}

impl PunchAggregator {
    /// Creates an aggregator.
    pub fn new(
        punches: Arc<dyn PunchStore>,
        summaries: Arc<dyn SummaryStore>,
        clock: Arc<dyn Clock>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            punches,
            summaries,
            clock,
            config,
        }
    }

    /// The aggregation settings in use.
    pub fn config(&self) -> AggregationConfig {
        self.config
    }

    /// Recomputes and upserts the summary for `employee_id` on `date`.
    ///
    /// `date` is a calendar date in the tenant's time zone. A session left
    /// open at the end of the previous day counts from midnight; only one
    /// day back is inspected. A session still open at the end of `date`
    /// counts up to its closing LEAVE when one exists, provisionally up to
    /// now otherwise.
    pub async fn recompute(
        &self,
        tenant: &Tenant,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<DaySummary> {
        let (day_start, day_end) = day_bounds(date);
        let mut boundary = DayBoundary::default();

        if let Some(previous) = date.pred_opt() {
            let (previous_start, _) = day_bounds(previous);
            let previous_events = self
                .punches
                .list_events(employee_id, &tenant.id, previous_start..day_start)
                .await?;
            boundary.carried_in = open_at_day_end(&previous_events, previous, self.config, None);
        }

        let events = self
            .punches
            .list_events(employee_id, &tenant.id, day_start..day_end)
            .await?;

        if let Some(since) = open_at_day_end(&events, date, self.config, boundary.carried_in) {
            boundary.closing_leave = self
                .punches
                .find_leave_after(employee_id, &tenant.id, since)
                .await?
                .map(|leave| leave.timestamp);
        }

        let now = self.clock.now_local(&tenant.timezone);
        let totals = summarize_day_with(&events, date, now, self.config, boundary);

        let key = DaySummaryKey::new(tenant.id.clone(), employee_id, date);
        let summary = self.summaries.upsert_day_summary(&key, totals).await?;

        debug!(
            tenant_id = %tenant.id,
            employee_id,
            %date,
            events = events.len(),
            carried_in = boundary.carried_in.is_some(),
            total_minutes = summary.total_minutes,
            overtime_minutes = summary.overtime_minutes,
            in_progress = summary.in_progress,
            "Recomputed day summary"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{PunchEvent, PunchKind, SummaryStatus, TenantTimezone};
    use crate::store::MemoryStore;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn tenant() -> Tenant {
        Tenant {
            id: "acme".to_string(),
            timezone: TenantTimezone::utc(),
            closure_policy: Default::default(),
            active: true,
        }
    }

    fn setup(now: &str) -> (Arc<MemoryStore>, PunchAggregator) {
        let store = Arc::new(MemoryStore::new());
        let aggregator = PunchAggregator::new(
            store.clone(),
            store.clone(),
            Arc::new(FixedClock::at(at(now))),
            AggregationConfig::default(),
        );
        (store, aggregator)
    }

    fn punch(store: &MemoryStore, kind: PunchKind, when: &str) {
        store.insert_event(PunchEvent::new("acme", "emp_001", kind, at(when)));
    }

    #[tokio::test]
    async fn test_recompute_creates_summary() {
        let (store, aggregator) = setup("2026-01-15 20:00");
        punch(&store, PunchKind::Arrive, "2026-01-15 08:00");
        punch(&store, PunchKind::BreakStart, "2026-01-15 12:00");
        punch(&store, PunchKind::BreakEnd, "2026-01-15 12:30");
        punch(&store, PunchKind::Leave, "2026-01-15 17:00");

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let summary = aggregator.recompute(&tenant(), "emp_001", date).await.unwrap();

        assert_eq!(summary.total_minutes, 540);
        assert_eq!(summary.overtime_minutes, 60);
        assert_eq!(summary.status, SummaryStatus::Pending);

        let stored = store
            .get_day_summary(&DaySummaryKey::new("acme", "emp_001", date))
            .await
            .unwrap();
        assert_eq!(stored, Some(summary));
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let (store, aggregator) = setup("2026-01-15 20:00");
        punch(&store, PunchKind::Arrive, "2026-01-15 09:00");
        punch(&store, PunchKind::Leave, "2026-01-15 15:00");

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let first = aggregator.recompute(&tenant(), "emp_001", date).await.unwrap();
        let second = aggregator.recompute(&tenant(), "emp_001", date).await.unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_recompute_ignores_neighbouring_days() {
        let (store, aggregator) = setup("2026-01-16 20:00");
        punch(&store, PunchKind::Arrive, "2026-01-15 08:00");
        punch(&store, PunchKind::Leave, "2026-01-15 16:00");
        punch(&store, PunchKind::Arrive, "2026-01-16 10:00");
        punch(&store, PunchKind::Leave, "2026-01-16 11:00");

        let date = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        let summary = aggregator.recompute(&tenant(), "emp_001", date).await.unwrap();
        assert_eq!(summary.total_minutes, 60);
    }

    #[tokio::test]
    async fn test_recompute_uses_tenant_local_now() {
        // 06:00 UTC is 09:00 for a UTC+3 tenant
        let (store, aggregator) = setup("2026-01-15 06:00");
        punch(&store, PunchKind::Arrive, "2026-01-15 08:00");

        let mut tenant = tenant();
        tenant.timezone = TenantTimezone::from_offset_minutes(180).unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let summary = aggregator.recompute(&tenant, "emp_001", date).await.unwrap();
        assert_eq!(summary.total_minutes, 60);
        assert!(summary.in_progress);
    }

    #[tokio::test]
    async fn test_recompute_counts_overnight_session_on_both_days() {
        let (store, aggregator) = setup("2026-01-15 08:00");
        punch(&store, PunchKind::Arrive, "2026-01-14 23:50");
        punch(&store, PunchKind::Leave, "2026-01-15 06:00");

        let opened = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        let first = aggregator.recompute(&tenant(), "emp_001", opened).await.unwrap();
        assert_eq!(first.total_minutes, 10);
        assert!(!first.in_progress);
        assert_eq!(first.last_leave, None);

        let closed = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let second = aggregator.recompute(&tenant(), "emp_001", closed).await.unwrap();
        assert_eq!(second.total_minutes, 360);
        assert!(!second.in_progress);
        assert_eq!(second.first_arrive, None);
        assert_eq!(second.last_leave, Some(at("2026-01-15 06:00")));
    }

    #[tokio::test]
    async fn test_recompute_keeps_overnight_session_in_progress_without_leave() {
        let (store, aggregator) = setup("2026-01-15 02:00");
        punch(&store, PunchKind::Arrive, "2026-01-14 22:00");

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let summary = aggregator.recompute(&tenant(), "emp_001", date).await.unwrap();
        assert_eq!(summary.total_minutes, 120);
        assert!(summary.in_progress);
    }
}
