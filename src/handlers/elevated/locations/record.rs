// handlers/elevated/locations/record.rs - location documents

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::location::Location;
use crate::services::location_service::{CreateLocationRequest, LocationService};
use crate::state::AppState;

/// Direct listing of organizations/{org}/locations
pub async fn locations_get(State(state): State<AppState>, Extension(ctx): Extension<TenantContext>) -> ApiResult<Vec<Location>> {
    let service = LocationService::new(state.store.clone(), ctx);
    Ok(ApiResponse::success(service.list().await?))
}

/**
 * POST /api/admin/locations - Open a new location
 *
 * ```json
 * { "name": "Grădinița Soare - Sector 3", "address": "...", "capacity": 80, "program": "07:30-17:30" }
 * ```
 *
 * Groups are added afterwards through the groups endpoints.
 */
pub async fn locations_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(request): Json<CreateLocationRequest>,
) -> ApiResult<Location> {
    let service = LocationService::new(state.store.clone(), ctx);
    Ok(ApiResponse::created(service.create(request).await?))
}

pub async fn location_admin_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(location_id): Path<String>,
) -> ApiResult<Location> {
    let service = LocationService::new(state.store.clone(), ctx);
    Ok(ApiResponse::success(service.get(&location_id).await?))
}

pub async fn location_patch(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(location_id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Location> {
    let service = LocationService::new(state.store.clone(), ctx);
    Ok(ApiResponse::success(service.update(&location_id, patch).await?))
}
