//! Error types for the Attendance Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while resolving schedules,
//! aggregating punches and sweeping open sessions.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Attendance Engine.
///
/// Not every variant is fatal to its caller: the closure sweeper treats a
/// [`EngineError::Resolution`] as "no shifts resolved" and only logs a
/// [`EngineError::Notification`].
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::TenantNotFound {
///     tenant_id: "acme".to_string(),
/// };
/// assert_eq!(error.to_string(), "Tenant not found: acme");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was out of range.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The tenant directory has no tenant with this id.
    #[error("Tenant not found: {tenant_id}")]
    TenantNotFound {
        /// The tenant id that was looked up.
        tenant_id: String,
    },

    /// A backing store or directory call failed.
    #[error("Store operation '{operation}' failed: {message}")]
    Store {
        /// The store operation that failed (e.g. "list_events").
        operation: String,
        /// A description of the failure.
        message: String,
    },

    /// Shift lookup failed while resolving an employee's schedule.
    #[error("Failed to resolve schedule for employee '{employee_id}' on {date}: {message}")]
    Resolution {
        /// The employee whose schedule was being resolved.
        employee_id: String,
        /// The date being resolved.
        date: NaiveDate,
        /// A description of the failure.
        message: String,
    },

    /// A punch event could not be folded into a day summary.
    #[error("Aggregation error for employee '{employee_id}': {message}")]
    Aggregation {
        /// The employee whose events were being aggregated.
        employee_id: String,
        /// A description of the offending event.
        message: String,
    },

    /// The auto-close notification could not be delivered.
    #[error("Notification for employee '{employee_id}' failed: {message}")]
    Notification {
        /// The employee the notification was about.
        employee_id: String,
        /// A description of the delivery failure.
        message: String,
    },

    /// A shift definition was invalid or contained inconsistent data.
    #[error("Invalid shift '{shift_id}': {message}")]
    InvalidShift {
        /// The ID of the invalid shift.
        shift_id: String,
        /// A description of what made the shift invalid.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Store`] error.
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_config_displays_field() {
        let error = EngineError::InvalidConfig {
            field: "sweeper.concurrency".to_string(),
            message: "must be at least 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value 'sweeper.concurrency': must be at least 1"
        );
    }

    #[test]
    fn test_store_helper_builds_store_variant() {
        let error = EngineError::store("list_events", "connection reset");
        assert_eq!(
            error.to_string(),
            "Store operation 'list_events' failed: connection reset"
        );
    }

    #[test]
    fn test_resolution_error_displays_employee_and_date() {
        let error = EngineError::Resolution {
            employee_id: "emp_001".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            message: "shift 'night' not found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to resolve schedule for employee 'emp_001' on 2026-01-15: shift 'night' not found"
        );
    }

    #[test]
    fn test_notification_error_displays_message() {
        let error = EngineError::Notification {
            employee_id: "emp_001".to_string(),
            message: "timed out".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Notification for employee 'emp_001' failed: timed out"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_tenant_not_found() -> EngineResult<()> {
            Err(EngineError::TenantNotFound {
                tenant_id: "missing".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_tenant_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
