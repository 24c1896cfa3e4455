// handlers/protected/attendance/child.rs - per-child attendance
//
// GET /api/children/:cnp/attendance?from=&to=
// GET /api/children/:cnp/attendance/summary?month=YYYY-MM
// GET /api/children/:cnp/attendance/:date
// PUT /api/children/:cnp/attendance/:date

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;

use super::service;
use crate::handlers::protected::{DateRange, MonthQuery};
use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::attendance::{AttendanceRecord, AttendanceSummary};
use crate::services::attendance_service::{HistoryEntry, MarkRequest};
use crate::services::month_bounds;
use crate::state::AppState;

pub async fn attendance_history_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(cnp): Path<String>,
    Query(range): Query<DateRange>,
) -> ApiResult<Vec<HistoryEntry>> {
    let (from, to) = range.checked()?;
    Ok(ApiResponse::success(service(&state, ctx)?.history(&cnp, from, to).await?))
}

pub async fn attendance_summary_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(cnp): Path<String>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<AttendanceSummary> {
    let (from, to) = month_bounds(&query.month)?;
    Ok(ApiResponse::success(service(&state, ctx)?.summary(&cnp, from, to).await?))
}

pub async fn attendance_day_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((cnp, date)): Path<(String, NaiveDate)>,
) -> ApiResult<AttendanceRecord> {
    Ok(ApiResponse::success(service(&state, ctx)?.get(&cnp, date).await?))
}

/**
 * PUT /api/children/:cnp/attendance/:date - Mark one child for one day
 *
 * ```json
 * { "status": "present", "checkIn": "08:05", "checkOut": "16:00", "notes": "..." }
 * ```
 *
 * Overwrites any earlier mark for the same day. Staff and owners only.
 */
pub async fn attendance_day_put(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((cnp, date)): Path<(String, NaiveDate)>,
    Json(request): Json<MarkRequest>,
) -> ApiResult<AttendanceRecord> {
    Ok(ApiResponse::success(service(&state, ctx)?.mark(&cnp, date, request).await?))
}
