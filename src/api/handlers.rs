//! HTTP request handlers for the internal API.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::request::{RecomputeRequest, ResolveRequest};
use super::response::{ApiError, ApiErrorResponse, ResolveResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/summaries/recompute", post(recompute_handler))
        .route("/schedules/resolve", post(resolve_handler))
        .with_state(state)
}

/// Handler for POST /summaries/recompute.
///
/// Rebuilds the employee's summary for the date from the punch stream and
/// returns the stored row.
async fn recompute_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecomputeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing recompute request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let tenant = match state.tenant(&request.tenant_id).await {
        Ok(tenant) => tenant,
        Err(err) => return engine_error(err, correlation_id),
    };

    match state
        .aggregator()
        .recompute(&tenant, &request.employee_id, request.date)
        .await
    {
        Ok(summary) => {
            info!(
                correlation_id = %correlation_id,
                tenant_id = %request.tenant_id,
                employee_id = %request.employee_id,
                date = %request.date,
                total_minutes = summary.total_minutes,
                duration_us = start_time.elapsed().as_micros(),
                "Recompute completed successfully"
            );
            json_ok(&summary)
        }
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for POST /schedules/resolve.
async fn resolve_handler(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing resolve request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    if let Err(err) = state.tenant(&request.tenant_id).await {
        return engine_error(err, correlation_id);
    }

    match state
        .resolver()
        .resolve(&request.tenant_id, &request.employee_id, request.date)
        .await
    {
        Ok(shifts) => {
            info!(
                correlation_id = %correlation_id,
                tenant_id = %request.tenant_id,
                employee_id = %request.employee_id,
                date = %request.date,
                shifts_count = shifts.len(),
                "Resolve completed successfully"
            );
            json_ok(&ResolveResponse {
                date: request.date,
                shifts: shifts.into_iter().map(Into::into).collect(),
            })
        }
        Err(err) => engine_error(err, correlation_id),
    }
}

fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message, including the field name
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    Err((
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response())
}

fn engine_error(err: crate::error::EngineError, correlation_id: Uuid) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

fn json_ok<T: Serialize>(body: &T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}
