//! The recurring closure sweep.
//!
//! Every cycle walks all active tenants with automatic closure enabled,
//! evaluates the last punch of each active employee and, where the policy
//! says so, writes a synthetic LEAVE, refreshes the day summary and sends a
//! best-effort notification.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::aggregation::PunchAggregator;
use crate::clock::Clock;
use crate::config::SweeperConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{ClosurePolicy, PunchEvent, Tenant};
use crate::schedule::ScheduleResolver;
use crate::store::{AppendOutcome, EmployeeDirectory, NotificationSink, PunchStore, TenantDirectory};

use super::decision::{
    ClosureDecision, ClosureReason, NoActionReason, check_open_session, decide_closure,
};
use super::jitter::JitterSource;

/// Collaborators the sweeper works through.
#[derive(Clone)]
pub struct SweeperServices {
    /// Source of tenants and their closure policies.
    pub tenants: Arc<dyn TenantDirectory>,
    /// Source of active employees per tenant.
    pub employees: Arc<dyn EmployeeDirectory>,
    /// Punch event storage.
    pub punches: Arc<dyn PunchStore>,
    /// Shared schedule resolver.
    pub resolver: ScheduleResolver,
    /// Shared aggregator, called after each closure.
    pub aggregator: Arc<PunchAggregator>,
    /// Auto-close notification delivery.
    pub notifier: Arc<dyn NotificationSink>,
    /// Source of "now".
    pub clock: Arc<dyn Clock>,
    /// Jitter for in-shift closures.
    pub jitter: Arc<dyn JitterSource>,
}

/// What happened to one employee during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeOutcome {
    /// The employee has never punched.
    NoEvents,
    /// The session was left alone.
    NoAction(NoActionReason),
    /// A synthetic LEAVE was written.
    Closed {
        /// Tenant-local timestamp of the synthetic LEAVE.
        at: NaiveDateTime,
        /// Which case triggered.
        reason: ClosureReason,
    },
    /// A LEAVE appeared between evaluation and write; nothing was written.
    AlreadyClosed,
}

/// Counters for one sweep cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// True if the cycle did not run because another was in progress.
    pub skipped: bool,
    /// Tenants with closure enabled that were swept.
    pub tenants_scanned: usize,
    /// Employees whose last punch was evaluated.
    pub employees_evaluated: usize,
    /// Sessions closed this cycle.
    pub sessions_closed: usize,
    /// Closures aborted because a LEAVE already existed.
    pub already_closed: usize,
    /// Tenants or employees whose evaluation failed.
    pub failures: usize,
}

/// Clears the busy flag when a cycle ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodically closes sessions employees forgot to close.
pub struct ClosureSweeper {
    services: SweeperServices,
    config: SweeperConfig,
    default_policy: ClosurePolicy,
    busy: AtomicBool,
}

impl ClosureSweeper {
    /// Creates a sweeper.
    ///
    /// `default_policy` applies to tenants that carry no closure policy of
    /// their own.
    pub fn new(
        services: SweeperServices,
        config: SweeperConfig,
        default_policy: ClosurePolicy,
    ) -> Self {
        Self {
            services,
            config,
            default_policy,
            busy: AtomicBool::new(false),
        }
    }

    /// The closure policy in force for `tenant`.
    pub fn policy_for(&self, tenant: &Tenant) -> ClosurePolicy {
        tenant.closure_policy_or(&self.default_policy)
    }

    /// Starts the sweep loop as a task owned by the caller.
    ///
    /// The task stops when `cancel` is triggered; a cycle already in
    /// progress runs to completion first.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// Runs sweep cycles on a fixed interval until `cancel` is triggered.
    ///
    /// Ticks that elapse while a cycle is still running are skipped rather
    /// than queued.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.config.interval_secs,
            concurrency = self.config.concurrency,
            "Closure sweeper started"
        );

        // tokio rejects a zero period
        let period = self.config.interval().max(Duration::from_secs(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Closure sweeper stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// Runs one sweep across all tenants.
    ///
    /// Returns immediately with `skipped = true` if another cycle is in
    /// progress.
    pub async fn run_cycle(&self) -> SweepReport {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Previous closure sweep still running, skipping this cycle");
            return SweepReport {
                skipped: true,
                ..SweepReport::default()
            };
        }
        let _busy = BusyGuard(&self.busy);

        let cycle_id = Uuid::new_v4();
        let started = Instant::now();
        info!(cycle_id = %cycle_id, "Closure sweep started");

        let mut report = SweepReport::default();
        match self.services.tenants.list_tenants(true).await {
            Ok(tenants) => {
                for tenant in tenants.iter() {
                    let policy = self.policy_for(tenant);
                    if !policy.enabled {
                        continue;
                    }
                    if let Err(e) = policy.validate("closure_policy") {
                        report.failures += 1;
                        error!(
                            cycle_id = %cycle_id,
                            tenant_id = %tenant.id,
                            error = %e,
                            "Skipping tenant with an invalid closure policy"
                        );
                        continue;
                    }
                    report.tenants_scanned += 1;
                    if let Err(e) = self.sweep_tenant(tenant, &mut report).await {
                        report.failures += 1;
                        error!(
                            cycle_id = %cycle_id,
                            tenant_id = %tenant.id,
                            error = %e,
                            "Closure sweep failed for tenant"
                        );
                    }
                }
            }
            Err(e) => {
                report.failures += 1;
                error!(cycle_id = %cycle_id, error = %e, "Failed to list tenants");
            }
        }

        info!(
            cycle_id = %cycle_id,
            tenants = report.tenants_scanned,
            employees = report.employees_evaluated,
            closed = report.sessions_closed,
            already_closed = report.already_closed,
            failures = report.failures,
            duration_ms = started.elapsed().as_millis() as u64,
            "Closure sweep completed"
        );
        report
    }

    async fn sweep_tenant(&self, tenant: &Tenant, report: &mut SweepReport) -> EngineResult<()> {
        let employees = self
            .services
            .employees
            .list_active_employees(&tenant.id)
            .await?;

        let outcomes: Vec<(String, EngineResult<EmployeeOutcome>)> = stream::iter(employees)
            .map(|employee| async move {
                let outcome = self.evaluate_employee(tenant, &employee.id).await;
                (employee.id, outcome)
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        for (employee_id, outcome) in outcomes {
            report.employees_evaluated += 1;
            match outcome {
                Ok(EmployeeOutcome::Closed { .. }) => report.sessions_closed += 1,
                Ok(EmployeeOutcome::AlreadyClosed) => report.already_closed += 1,
                Ok(_) => {}
                Err(e) => {
                    report.failures += 1;
                    error!(
                        tenant_id = %tenant.id,
                        employee_id = %employee_id,
                        error = %e,
                        "Closure evaluation failed for employee"
                    );
                }
            }
        }
        Ok(())
    }

    /// Evaluates one employee's last punch and closes the session if the
    /// tenant's policy says so.
    pub async fn evaluate_employee(
        &self,
        tenant: &Tenant,
        employee_id: &str,
    ) -> EngineResult<EmployeeOutcome> {
        let services = &self.services;
        let Some(last_event) = services.punches.latest_event(employee_id, &tenant.id).await? else {
            return Ok(EmployeeOutcome::NoEvents);
        };

        let now = services.clock.now_local(&tenant.timezone);
        let policy = &self.policy_for(tenant);
        if let Err(reason) = check_open_session(&last_event, now, policy) {
            return Ok(EmployeeOutcome::NoAction(reason));
        }

        let opened_on = last_event.timestamp.date();
        let shifts = services
            .resolver
            .resolve_or_rest_day(&tenant.id, employee_id, opened_on)
            .await;

        let (at, reason, shift_id) =
            match decide_closure(&last_event, now, policy, &shifts, services.jitter.as_ref()) {
                ClosureDecision::NoAction(reason) => {
                    debug!(
                        tenant_id = %tenant.id,
                        employee_id,
                        ?reason,
                        "Open session left alone"
                    );
                    return Ok(EmployeeOutcome::NoAction(reason));
                }
                ClosureDecision::Close {
                    at,
                    reason,
                    shift_id,
                } => (at, reason, shift_id),
            };

        let note = reason.to_string();
        let leave = PunchEvent::auto_close(&tenant.id, employee_id, at, note.clone());
        if let AppendOutcome::LeaveExists(existing) = services
            .punches
            .append_closure(leave, last_event.timestamp)
            .await?
        {
            info!(
                tenant_id = %tenant.id,
                employee_id,
                opened_at = %last_event.timestamp,
                existing_leave = %existing.timestamp,
                "Session already closed, skipping synthetic LEAVE"
            );
            return Ok(EmployeeOutcome::AlreadyClosed);
        }

        info!(
            tenant_id = %tenant.id,
            employee_id,
            date = %opened_on,
            opened_at = %last_event.timestamp,
            closed_at = %at,
            shift_id = shift_id.as_deref().unwrap_or("-"),
            reason = %note,
            "Closed open session"
        );

        self.refresh_summary(tenant, employee_id, opened_on).await;
        if at.date() != opened_on {
            self.refresh_summary(tenant, employee_id, at.date()).await;
        }
        self.notify(tenant, employee_id, &note).await;

        Ok(EmployeeOutcome::Closed { at, reason })
    }

    async fn refresh_summary(&self, tenant: &Tenant, employee_id: &str, date: NaiveDate) {
        if let Err(e) = self
            .services
            .aggregator
            .recompute(tenant, employee_id, date)
            .await
        {
            error!(
                tenant_id = %tenant.id,
                employee_id,
                %date,
                error = %e,
                "Failed to refresh day summary after closure"
            );
        }
    }

    async fn notify(&self, tenant: &Tenant, employee_id: &str, reason: &str) {
        let delivery = tokio::time::timeout(
            self.config.notification_timeout(),
            self.services
                .notifier
                .notify_auto_close(employee_id, &tenant.id, reason),
        )
        .await;

        let failure = match delivery {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(_) => EngineError::Notification {
                employee_id: employee_id.to_string(),
                message: format!(
                    "timed out after {}s",
                    self.config.notification_timeout_secs
                ),
            },
        };
        warn!(
            tenant_id = %tenant.id,
            employee_id,
            error = %failure,
            "Auto-close notification failed"
        );
    }
}
