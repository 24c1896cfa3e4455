// handlers/protected/reports/mod.rs - Daily report endpoints
//
// GET /api/children/:cnp/reports?from=&to=
// GET /api/children/:cnp/reports/:date
// PUT /api/children/:cnp/reports/:date
// GET /api/reports/groups/:grupa_id/:date

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;

use super::DateRange;
use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::daily_report::DailyReport;
use crate::services::daily_report_service::{DailyReportInput, DailyReportService};
use crate::state::AppState;

pub async fn child_reports_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(cnp): Path<String>,
    Query(range): Query<DateRange>,
) -> ApiResult<Vec<DailyReport>> {
    let (from, to) = range.checked()?;
    let service = DailyReportService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.list_for_child(&cnp, from, to).await?))
}

pub async fn report_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((cnp, date)): Path<(String, NaiveDate)>,
) -> ApiResult<DailyReport> {
    let service = DailyReportService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.get(&cnp, date).await?))
}

/**
 * PUT /api/children/:cnp/reports/:date - Write the day's report for a child
 *
 * ```json
 * {
 *   "meals": { "micDejun": "all", "gustare": "half", "pranz": "all", "gustareDupaAmiaza": "not_served" },
 *   "sleep": { "start": "13:00", "end": "14:30" },
 *   "mood": "happy",
 *   "hygiene": "...", "activities": "...", "notes": "..."
 * }
 * ```
 */
pub async fn report_put(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((cnp, date)): Path<(String, NaiveDate)>,
    Json(input): Json<DailyReportInput>,
) -> ApiResult<DailyReport> {
    let service = DailyReportService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.save(&cnp, date, input).await?))
}

pub async fn group_reports_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((grupa_id, date)): Path<(String, NaiveDate)>,
) -> ApiResult<Vec<DailyReport>> {
    let service = DailyReportService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.list_for_group(&grupa_id, date).await?))
}
