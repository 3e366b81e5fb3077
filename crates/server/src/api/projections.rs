//! Read-only dashboard views: due today, overdue, calendar and counts.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use upkeep_schedule::{CalendarItem, Schedule, ScheduleStats};

use super::{schedule_error, ApiResult, Tenant};
use crate::state::AppState;

pub async fn due_today(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
) -> ApiResult<Json<Vec<Schedule>>> {
    state
        .projections
        .due_today(tenant)
        .await
        .map(Json)
        .map_err(schedule_error)
}

pub async fn overdue(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
) -> ApiResult<Json<Vec<Schedule>>> {
    state
        .projections
        .overdue(tenant)
        .await
        .map(Json)
        .map_err(schedule_error)
}

#[derive(Debug, Deserialize)]
pub struct CalendarParams {
    pub month: u32,
    pub year: i32,
}

pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Query(params): Query<CalendarParams>,
) -> ApiResult<Json<Vec<CalendarItem>>> {
    state
        .projections
        .calendar(tenant, params.month, params.year)
        .await
        .map(Json)
        .map_err(schedule_error)
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
) -> ApiResult<Json<ScheduleStats>> {
    state
        .projections
        .stats(tenant)
        .await
        .map(Json)
        .map_err(schedule_error)
}
