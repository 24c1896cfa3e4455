// handlers/protected/gallery/mod.rs - Photo gallery
//
// GET, POST   /api/gallery
// GET, DELETE /api/gallery/:id

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::gallery::GalleryItem;
use crate::services::gallery_service::{GalleryInput, GalleryService};
use crate::state::AppState;

pub async fn gallery_get(State(state): State<AppState>, Extension(ctx): Extension<TenantContext>) -> ApiResult<Vec<GalleryItem>> {
    let service = GalleryService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.list().await?))
}

/// Image URLs point at external storage; only the links are stored here.
pub async fn gallery_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<GalleryInput>,
) -> ApiResult<GalleryItem> {
    let service = GalleryService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.create(input).await?))
}

pub async fn gallery_item_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<GalleryItem> {
    let service = GalleryService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.get(&id).await?))
}

pub async fn gallery_item_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let service = GalleryService::new(state.store.clone(), ctx)?;
    service.delete(&id).await?;
    Ok(ApiResponse::no_content())
}
