//! Schedule CRUD, lifecycle transitions and completion history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use upkeep_core::{AssetId, LocationId, ScheduleId};
use upkeep_schedule::{
    preview_occurrences, Completion, CompletionInput, NewSchedule, RecurrenceSpec, Schedule,
    ScheduleFilter, ScheduleUpdate, MAX_PREVIEW_COUNT,
};

use super::{bad_request, schedule_error, ApiResult, Tenant};
use crate::state::AppState;

const DEFAULT_PREVIEW_COUNT: usize = 5;

// ── List / read ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub asset_id: Option<AssetId>,
    pub location_id: Option<LocationId>,
    /// `true` restricts to active schedules.
    pub active: Option<bool>,
}

pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Schedule>>> {
    let filter = ScheduleFilter {
        asset_id: params.asset_id,
        location_id: params.location_id,
        active_only: params.active.unwrap_or(false),
        ..ScheduleFilter::default()
    };
    state
        .projections
        .list(tenant, &filter)
        .await
        .map(Json)
        .map_err(schedule_error)
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<ScheduleId>,
) -> ApiResult<Json<Schedule>> {
    state
        .manager
        .get(tenant, id)
        .await
        .map(Json)
        .map_err(schedule_error)
}

pub async fn completion_history(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<ScheduleId>,
) -> ApiResult<Json<Vec<Completion>>> {
    state
        .manager
        .completion_history(tenant, id)
        .await
        .map(Json)
        .map_err(schedule_error)
}

// ── Writes ───────────────────────────────────────────────────────

pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Json(input): Json<NewSchedule>,
) -> ApiResult<(StatusCode, Json<Schedule>)> {
    let schedule = state
        .manager
        .create(tenant, input)
        .await
        .map_err(schedule_error)?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<ScheduleId>,
    Json(update): Json<ScheduleUpdate>,
) -> ApiResult<Json<Schedule>> {
    state
        .manager
        .update(tenant, id, update)
        .await
        .map(Json)
        .map_err(schedule_error)
}

pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<ScheduleId>,
) -> ApiResult<StatusCode> {
    state
        .manager
        .delete(tenant, id)
        .await
        .map_err(schedule_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_schedule(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<ScheduleId>,
) -> ApiResult<Json<Schedule>> {
    state
        .manager
        .activate(tenant, id)
        .await
        .map(Json)
        .map_err(schedule_error)
}

pub async fn deactivate_schedule(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<ScheduleId>,
) -> ApiResult<Json<Schedule>> {
    state
        .manager
        .deactivate(tenant, id)
        .await
        .map(Json)
        .map_err(schedule_error)
}

pub async fn complete_schedule(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<ScheduleId>,
    Json(input): Json<CompletionInput>,
) -> ApiResult<(StatusCode, Json<Completion>)> {
    let completion = state
        .manager
        .complete(tenant, id, input)
        .await
        .map_err(schedule_error)?;
    Ok((StatusCode::CREATED, Json(completion)))
}

// ── Preview ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(flatten)]
    pub recurrence: RecurrenceSpec,
    /// Reference date; defaults to today in the deployment's time zone.
    pub from: Option<NaiveDate>,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub from: NaiveDate,
    pub dates: Vec<NaiveDate>,
}

/// Upcoming due dates for a recurrence without persisting anything.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult<Json<PreviewResponse>> {
    req.recurrence.validate().map_err(schedule_error)?;
    let count = req.count.unwrap_or(DEFAULT_PREVIEW_COUNT);
    if count == 0 || count > MAX_PREVIEW_COUNT {
        return Err(bad_request(format!(
            "count must be between 1 and {}",
            MAX_PREVIEW_COUNT
        )));
    }
    let from = req.from.unwrap_or_else(|| state.manager.clock().today());
    Ok(Json(PreviewResponse {
        from,
        dates: preview_occurrences(&req.recurrence, from, count),
    }))
}
