//! Tenant, closure policy and employee reference models.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A tenant's local time zone, expressed as a fixed offset from UTC.
///
/// Serialized as whole minutes east of UTC.
///
/// # Example
///
/// ```
/// use attendance_engine::models::TenantTimezone;
/// use chrono::{TimeZone, Utc};
///
/// let madrid = TenantTimezone::from_offset_minutes(60).unwrap();
/// let utc = Utc.with_ymd_and_hms(2026, 1, 15, 7, 0, 0).unwrap();
/// assert_eq!(madrid.to_local(utc).to_string(), "2026-01-15 08:00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TenantTimezone(FixedOffset);

impl TenantTimezone {
    /// The UTC time zone.
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    /// Builds a time zone from an offset in minutes east of UTC.
    ///
    /// Returns `None` if the offset is not within ±24 hours.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self)
    }

    /// Offset in minutes east of UTC.
    pub fn offset_minutes(&self) -> i32 {
        self.0.local_minus_utc() / 60
    }

    /// Converts a UTC instant to tenant-local wall-clock time.
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.0).naive_local()
    }
}

impl Default for TenantTimezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl TryFrom<i32> for TenantTimezone {
    type Error = String;

    fn try_from(minutes: i32) -> Result<Self, Self::Error> {
        Self::from_offset_minutes(minutes)
            .ok_or_else(|| format!("UTC offset of {} minutes is out of range", minutes))
    }
}

impl From<TenantTimezone> for i32 {
    fn from(tz: TenantTimezone) -> Self {
        tz.offset_minutes()
    }
}

/// Per-tenant rules for automatically closing forgotten sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosurePolicy {
    /// Whether the sweeper closes sessions for this tenant at all.
    pub enabled: bool,
    /// Absolute maximum minutes a session may stay open.
    pub max_minutes: i64,
    /// Tolerance in minutes before a shift's start.
    pub margin_before_minutes: i64,
    /// Tolerance in minutes after a shift's end.
    pub margin_after_minutes: i64,
}

impl Default for ClosurePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_minutes: 480,
            margin_before_minutes: 15,
            margin_after_minutes: 30,
        }
    }
}

impl ClosurePolicy {
    /// Upper bound for every minute field: one week.
    pub const MAX_MINUTES: i64 = 7 * 24 * 60;

    /// Checks that every minute field is within `0..=MAX_MINUTES`.
    ///
    /// `scope` prefixes the field name in the error, e.g.
    /// `closure.default_policy`.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::models::ClosurePolicy;
    ///
    /// assert!(ClosurePolicy::default().validate("closure_policy").is_ok());
    ///
    /// let broken = ClosurePolicy { margin_before_minutes: -5, ..Default::default() };
    /// assert!(broken.validate("closure_policy").is_err());
    /// ```
    pub fn validate(&self, scope: &str) -> EngineResult<()> {
        for (field, value) in [
            ("max_minutes", self.max_minutes),
            ("margin_before_minutes", self.margin_before_minutes),
            ("margin_after_minutes", self.margin_after_minutes),
        ] {
            if !(0..=Self::MAX_MINUTES).contains(&value) {
                return Err(EngineError::InvalidConfig {
                    field: format!("{}.{}", scope, field),
                    message: format!("must be between 0 and {}, got {}", Self::MAX_MINUTES, value),
                });
            }
        }
        Ok(())
    }
}

/// A tenant as listed by the tenant directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier for the tenant.
    pub id: String,
    /// Local time zone all punches and shifts are expressed in.
    #[serde(rename = "utc_offset_minutes", default)]
    pub timezone: TenantTimezone,
    /// Automatic closure rules. `None` falls back to the configured default.
    #[serde(default)]
    pub closure_policy: Option<ClosurePolicy>,
    /// Inactive tenants are skipped by the sweeper.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Tenant {
    /// The tenant's own closure policy, or `default` when it has none.
    pub fn closure_policy_or(&self, default: &ClosurePolicy) -> ClosurePolicy {
        self.closure_policy.unwrap_or(*default)
    }
}

fn default_active() -> bool {
    true
}

/// An active employee as listed by the employee directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The tenant the employee belongs to.
    pub tenant_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_negative_offset_to_local() {
        let new_york = TenantTimezone::from_offset_minutes(-300).unwrap();
        let utc = Utc.with_ymd_and_hms(2026, 1, 15, 3, 0, 0).unwrap();
        assert_eq!(new_york.to_local(utc).to_string(), "2026-01-14 22:00:00");
        assert_eq!(new_york.offset_minutes(), -300);
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        assert!(TenantTimezone::from_offset_minutes(24 * 60).is_none());
        assert!(TenantTimezone::try_from(-24 * 60).is_err());
    }

    #[test]
    fn test_tenant_deserialization() {
        let json = r#"{
            "id": "acme",
            "utc_offset_minutes": 120,
            "closure_policy": {
                "enabled": true,
                "max_minutes": 600,
                "margin_before_minutes": 10,
                "margin_after_minutes": 20
            }
        }"#;

        let tenant: Tenant = serde_json::from_str(json).unwrap();
        assert_eq!(tenant.timezone.offset_minutes(), 120);
        assert!(tenant.active);
        let policy = tenant.closure_policy_or(&ClosurePolicy::default());
        assert!(policy.enabled);
        assert_eq!(policy.max_minutes, 600);
    }

    #[test]
    fn test_tenant_without_policy_uses_default() {
        let tenant: Tenant = serde_json::from_str(r#"{ "id": "acme" }"#).unwrap();
        assert_eq!(tenant.closure_policy, None);

        let configured = ClosurePolicy {
            enabled: true,
            max_minutes: 360,
            ..Default::default()
        };
        assert_eq!(tenant.closure_policy_or(&configured), configured);
    }

    #[test]
    fn test_tenant_rejects_bad_offset() {
        let json = r#"{ "id": "acme", "utc_offset_minutes": 5000 }"#;
        assert!(serde_json::from_str::<Tenant>(json).is_err());
    }

    #[test]
    fn test_default_policy_is_disabled() {
        let policy = ClosurePolicy::default();
        assert!(!policy.enabled);
        assert_eq!(policy.max_minutes, 480);
    }

    #[test]
    fn test_closure_policy_bounds() {
        let at_limit = ClosurePolicy {
            max_minutes: ClosurePolicy::MAX_MINUTES,
            margin_before_minutes: 0,
            ..Default::default()
        };
        assert!(at_limit.validate("closure_policy").is_ok());

        let oversized = ClosurePolicy {
            margin_before_minutes: i64::MAX / 2,
            ..Default::default()
        };
        match oversized.validate("closure_policy") {
            Err(EngineError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "closure_policy.margin_before_minutes");
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }
}
