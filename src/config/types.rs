//! Configuration types for the attendance engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `engine.yaml`. Every field has a default so a
//! partial file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::ClosurePolicy;

/// Standard working day used for overtime, in minutes.
pub const DEFAULT_STANDARD_DAILY_MINUTES: i64 = 8 * 60;

/// How break intervals count towards worked time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakPolicy {
    /// Breaks are part of the ARRIVE→LEAVE span and count in full.
    #[default]
    Include,
    /// BREAK_START→BREAK_END intervals are subtracted.
    Exclude,
}

/// Settings for the closure sweeper task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Seconds between sweep cycles.
    pub interval_secs: u64,
    /// Maximum employees evaluated concurrently within a tenant.
    pub concurrency: usize,
    /// Upper bound on a single notification call, in seconds.
    pub notification_timeout_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            concurrency: 8,
            notification_timeout_secs: 10,
        }
    }
}

impl SweeperConfig {
    /// Interval between sweep cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Timeout applied to each notification call.
    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }
}

/// Settings for day summary aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Minutes in a standard day; anything beyond is overtime.
    pub standard_daily_minutes: i64,
    /// Whether breaks count as worked time.
    pub break_policy: BreakPolicy,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            standard_daily_minutes: DEFAULT_STANDARD_DAILY_MINUTES,
            break_policy: BreakPolicy::Include,
        }
    }
}

/// Closure defaults for tenants that carry no explicit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosureConfig {
    /// Policy applied when the tenant directory supplies none.
    pub default_policy: ClosurePolicy,
}

/// The complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sweeper task settings.
    pub sweeper: SweeperConfig,
    /// Aggregation settings.
    pub aggregation: AggregationConfig,
    /// Closure defaults.
    pub closure: ClosureConfig,
}

impl EngineConfig {
    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.sweeper.interval_secs == 0 {
            return Err(invalid("sweeper.interval_secs", "must be greater than zero"));
        }
        if self.sweeper.concurrency == 0 {
            return Err(invalid("sweeper.concurrency", "must be at least 1"));
        }
        if self.sweeper.notification_timeout_secs == 0 {
            return Err(invalid(
                "sweeper.notification_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.aggregation.standard_daily_minutes < 0 {
            return Err(invalid(
                "aggregation.standard_daily_minutes",
                "must not be negative",
            ));
        }

        self.closure.default_policy.validate("closure.default_policy")
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}
