//! Response types for the internal API.
//!
//! This module defines the success bodies, the error response structure and
//! the mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::schedule::ResolvedShift;

/// One shift in a [`ResolveResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedShiftView {
    /// The shift id.
    pub shift_id: String,
    /// The shift's display name.
    pub name: String,
    /// Window start on the resolved date.
    pub start: NaiveDateTime,
    /// Window end; on the following day for overnight shifts.
    pub end: NaiveDateTime,
    /// True if the shift came from a weekly assignment.
    pub is_override: bool,
}

impl From<ResolvedShift> for ResolvedShiftView {
    fn from(resolved: ResolvedShift) -> Self {
        Self {
            shift_id: resolved.shift.id,
            name: resolved.shift.name,
            start: resolved.window.start,
            end: resolved.window.end,
            is_override: resolved.is_override,
        }
    }
}

/// Body returned by `POST /schedules/resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// The resolved date.
    pub date: NaiveDate,
    /// Shifts ordered by start; empty on a rest day.
    pub shifts: Vec<ResolvedShiftView>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a tenant not found error response.
    pub fn tenant_not_found(tenant_id: &str) -> Self {
        Self::with_details(
            "TENANT_NOT_FOUND",
            format!("Tenant not found: {}", tenant_id),
            format!("No tenant with id '{}' is known to this engine", tenant_id),
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let internal = |code: &str, message: &str, details: String| ApiErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::with_details(code, message, details),
        };

        match error {
            EngineError::TenantNotFound { tenant_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::tenant_not_found(&tenant_id),
            },
            EngineError::Resolution {
                employee_id,
                date,
                message,
            } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "RESOLUTION_ERROR",
                    format!(
                        "Could not resolve schedule for employee '{}' on {}",
                        employee_id, date
                    ),
                    message,
                ),
            },
            EngineError::InvalidShift { shift_id, message } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "INVALID_SHIFT",
                    format!("Invalid shift '{}': {}", shift_id, message),
                    "The stored shift definition is inconsistent",
                ),
            },
            err @ (EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. }) => {
                internal("CONFIG_ERROR", "Configuration error", err.to_string())
            }
            err @ EngineError::Store { .. } => {
                internal("STORE_ERROR", "Storage failure", err.to_string())
            }
            err @ (EngineError::Aggregation { .. } | EngineError::Notification { .. }) => {
                internal("INTERNAL_ERROR", "Internal error", err.to_string())
            }
        }
    }
}
