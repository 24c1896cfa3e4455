// handlers/protected/menus/mod.rs - Weekly menus
//
// GET, POST          /api/menus
// GET                /api/menus/current?date=YYYY-MM-DD
// POST               /api/menus/generate
// GET, PATCH, DELETE /api/menus/:id
// POST               /api/menus/:id/publish

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::ai::menu::MenuRequest;
use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::menu::Menu;
use crate::services::menu_service::{MenuInput, MenuService, PublishRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// Drafts and published menus; guardians only see published ones.
pub async fn menus_get(State(state): State<AppState>, Extension(ctx): Extension<TenantContext>) -> ApiResult<Vec<Menu>> {
    let service = MenuService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.list().await?))
}

pub async fn menus_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(input): Json<MenuInput>,
) -> ApiResult<Menu> {
    let service = MenuService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.create(input).await?))
}

/// Published menu covering the date (today when omitted); `null` when none does.
pub async fn menu_current_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Option<Menu>> {
    let date = query.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let service = MenuService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.for_date(date).await?))
}

/**
 * POST /api/menus/generate - Draft a menu from free-text ingredients
 *
 * ```json
 * { "ingredients": "pui, orez, morcovi... pentru 25 porții", "menuType": "meniu de iarnă" }
 * ```
 *
 * The completion must follow the fixed menu schema (per-meal calories,
 * protein, carbs, fat and ingredient quantities); anything else answers 502.
 * Without a configured AI endpoint this answers 503.
 */
pub async fn menu_generate_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(request): Json<MenuRequest>,
) -> ApiResult<Menu> {
    let service = MenuService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.generate(state.ai.as_deref(), request).await?))
}

pub async fn menu_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<Menu> {
    let service = MenuService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.get(&id).await?))
}

pub async fn menu_patch(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Menu> {
    let service = MenuService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.update(&id, patch).await?))
}

pub async fn menu_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let service = MenuService::new(state.store.clone(), ctx)?;
    service.delete(&id).await?;
    Ok(ApiResponse::no_content())
}

/**
 * POST /api/menus/:id/publish - Schedule a menu for a week
 *
 * ```json
 * { "weekStart": "2025-01-06", "force": false }
 * ```
 *
 * When other published menus overlap the week the answer is 409 with their
 * `id`, `title`, `weekStart` and `weekEnd` under `details`; resend with
 * `"force": true` to publish anyway.
 */
pub async fn menu_publish_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(request): Json<PublishRequest>,
) -> ApiResult<Menu> {
    let service = MenuService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.publish(&id, request).await?))
}
