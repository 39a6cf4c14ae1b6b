//! Injectable source of "now".
//!
//! Everything time-dependent in the engine asks a [`Clock`] instead of
//! calling `Utc::now()` directly, which keeps the sweeper deterministic in
//! tests.

use std::sync::RwLock;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::models::TenantTimezone;

/// A source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// The current wall-clock time in a tenant's time zone.
    fn now_local(&self, timezone: &TenantTimezone) -> NaiveDateTime {
        timezone.to_local(self.now_utc())
    }
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a settable instant.
///
/// # Example
///
/// ```
/// use attendance_engine::clock::{Clock, FixedClock};
/// use attendance_engine::models::TenantTimezone;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 18, 17, 35, 0).unwrap());
/// clock.advance(Duration::minutes(5));
/// assert_eq!(
///     clock.now_local(&TenantTimezone::utc()).to_string(),
///     "2026-01-18 17:40:00"
/// );
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Creates a clock frozen at a UTC wall-clock time.
    pub fn at(now: NaiveDateTime) -> Self {
        Self::new(now.and_utc())
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
