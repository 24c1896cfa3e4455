// handlers/protected/activities/mod.rs - Activity planning endpoints
//
// GET, POST          /api/activities
// GET, PATCH, DELETE /api/activities/:id
// POST               /api/activities/:id/photos

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::activity::Activity;
use crate::services::activity_service::{ActivityFilter, ActivityInput, ActivityService, PhotosRequest};
use crate::state::AppState;

/// GET /api/activities?grupaId=&status=&from=&to= - guardians only get their child's group
pub async fn activities_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(filter): Query<ActivityFilter>,
) -> ApiResult<Vec<Activity>> {
    let service = ActivityService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.list(filter).await?))
}

pub async fn activities_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<ActivityInput>,
) -> ApiResult<Activity> {
    let service = ActivityService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.create(input).await?))
}

pub async fn activity_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<Activity> {
    let service = ActivityService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.get(&id).await?))
}

pub async fn activity_patch(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Activity> {
    let service = ActivityService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.update(&id, patch).await?))
}

pub async fn activity_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let service = ActivityService::new(state.store.clone(), ctx)?;
    service.delete(&id).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/activities/:id/photos - `{ "urls": [...] }`, appended without duplicates
pub async fn activity_photos_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(request): Json<PhotosRequest>,
) -> ApiResult<Activity> {
    let service = ActivityService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.add_photos(&id, request.urls).await?))
}
