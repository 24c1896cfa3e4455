// handlers/protected/attendance/sheet.rs - group attendance sheet
//
// GET /api/attendance/groups/:grupa_id/:date
// PUT /api/attendance/:date

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;

use super::service;
use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::attendance_service::{GroupSheet, SaveSheetOutcome, SaveSheetRequest};
use crate::state::AppState;

/// Children of the group with their marks for the day; unmarked children are
/// pre-filled with the default check-in/check-out times.
pub async fn sheet_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((grupa_id, date)): Path<(String, NaiveDate)>,
) -> ApiResult<GroupSheet> {
    Ok(ApiResponse::success(service(&state, ctx)?.group_sheet(&grupa_id, date).await?))
}

/**
 * PUT /api/attendance/:date - Save a whole sheet
 *
 * Entries with status `not_marked` are skipped. The remaining entries are
 * written one by one; if a write fails the request answers 500 and the
 * entries written before the failure are kept.
 */
pub async fn sheet_put(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(date): Path<NaiveDate>,
    Json(request): Json<SaveSheetRequest>,
) -> ApiResult<SaveSheetOutcome> {
    Ok(ApiResponse::success(service(&state, ctx)?.save_sheet(date, request.entries).await?))
}
