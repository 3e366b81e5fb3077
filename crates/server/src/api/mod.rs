//! HTTP endpoints over the scheduling engine.
//!
//! Every `/api` route is tenant-scoped through the [`Tenant`] extractor.

mod health;
mod projections;
mod schedules;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use upkeep_core::TenantId;
use upkeep_schedule::ScheduleError;
use uuid::Uuid;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);
pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub const TENANT_HEADER: &str = "x-tenant-id";

// ── Error helpers ────────────────────────────────────────────────

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: msg.into() }),
    )
}

pub(crate) fn schedule_error(e: ScheduleError) -> ApiError {
    let status = match &e {
        ScheduleError::NotFound { .. } => StatusCode::NOT_FOUND,
        ScheduleError::Store(_) => {
            tracing::error!(error = %e, "schedule store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ if e.is_validation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// ── Tenant extractor ─────────────────────────────────────────────

/// Caller's tenant, read from the `x-tenant-id` header.
#[derive(Debug, Clone, Copy)]
pub struct Tenant(pub TenantId);

impl<S: Send + Sync> FromRequestParts<S> for Tenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(TENANT_HEADER)
            .ok_or_else(|| bad_request(format!("missing {} header", TENANT_HEADER)))?;
        let value = raw
            .to_str()
            .map_err(|_| bad_request(format!("{} header is not valid text", TENANT_HEADER)))?;
        Uuid::parse_str(value.trim())
            .map(Tenant)
            .map_err(|_| bad_request(format!("{} header must be a UUID", TENANT_HEADER)))
    }
}

// ── Re-exports ───────────────────────────────────────────────────

pub use health::health;
pub use projections::{calendar, due_today, overdue, stats};
pub use schedules::{
    activate_schedule, complete_schedule, completion_history, create_schedule,
    deactivate_schedule, delete_schedule, get_schedule, list_schedules, preview, update_schedule,
};
