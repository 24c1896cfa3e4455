// handlers/elevated/finance/mod.rs - GET /api/admin/locations/:location_id/finance?month=YYYY-MM

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use crate::handlers::protected::MonthQuery;
use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::finance_service::{FinanceReport, FinanceService};
use crate::state::AppState;

/**
 * Monthly report for one location: per-child fee, subscription and
 * attendance counts, plus totals by subscription type and by group, days
 * present and meals served.
 */
pub async fn finance_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(location_id): Path<String>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<FinanceReport> {
    let service = FinanceService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.monthly_report(&location_id, &query.month).await?))
}
