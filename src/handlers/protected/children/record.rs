// handlers/protected/children/record.rs - GET/PATCH/DELETE /api/children/:cnp

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::child_service::{ChildService, ChildView};
use crate::state::AppState;

pub async fn child_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(cnp): Path<String>,
) -> ApiResult<ChildView> {
    let service = ChildService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.get(&cnp).await?))
}

/// PATCH /api/children/:cnp - merge the provided fields; identity fields are immutable
pub async fn child_patch(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(cnp): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<ChildView> {
    let service = ChildService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.update(&cnp, patch).await?))
}

/// DELETE /api/children/:cnp - owner only; removes the child document
pub async fn child_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(cnp): Path<String>,
) -> ApiResult<()> {
    let service = ChildService::new(state.store.clone(), ctx)?;
    service.delete(&cnp).await?;
    Ok(ApiResponse::no_content())
}
