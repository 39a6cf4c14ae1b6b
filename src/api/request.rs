//! Request bodies for the internal API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /summaries/recompute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeRequest {
    /// Tenant the employee belongs to.
    pub tenant_id: String,
    /// Employee whose day should be recomputed.
    pub employee_id: String,
    /// Calendar date in the tenant's time zone.
    pub date: NaiveDate,
}

/// Body of `POST /schedules/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Tenant the employee belongs to.
    pub tenant_id: String,
    /// Employee whose schedule should be resolved.
    pub employee_id: String,
    /// Calendar date in the tenant's time zone.
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_recompute_request() {
        let json = r#"{"tenant_id": "acme", "employee_id": "emp_001", "date": "2026-01-18"}"#;
        let request: RecomputeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.tenant_id, "acme");
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2026, 1, 18).unwrap());
    }

    #[test]
    fn test_missing_date_is_rejected() {
        let json = r#"{"tenant_id": "acme", "employee_id": "emp_001"}"#;
        let result: Result<ResolveRequest, _> = serde_json::from_str(json);
        assert!(result.unwrap_err().to_string().contains("missing field"));
    }
}
