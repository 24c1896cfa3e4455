// handlers/elevated/locations/groups.rs - groups inside a location

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::location::Group;
use crate::services::location_service::{GroupRequest, LocationService};
use crate::state::AppState;

/// The group id is generated server-side; `nume` is required.
pub async fn groups_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(location_id): Path<String>,
    Json(request): Json<GroupRequest>,
) -> ApiResult<Group> {
    let service = LocationService::new(state.store.clone(), ctx);
    Ok(ApiResponse::created(service.add_group(&location_id, request).await?))
}

/// Rename or edit a group. Children keep pointing at it through `grupaId`.
pub async fn group_patch(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((location_id, grupa_id)): Path<(String, String)>,
    Json(request): Json<GroupRequest>,
) -> ApiResult<Group> {
    let service = LocationService::new(state.store.clone(), ctx);
    Ok(ApiResponse::success(service.update_group(&location_id, &grupa_id, request).await?))
}

/// 409 while children are still assigned to the group.
pub async fn group_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((location_id, grupa_id)): Path<(String, String)>,
) -> ApiResult<()> {
    let service = LocationService::new(state.store.clone(), ctx);
    service.remove_group(&location_id, &grupa_id).await?;
    Ok(ApiResponse::no_content())
}
