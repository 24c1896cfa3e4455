// handlers/protected/letters/mod.rs - Weekly parent letters
//
// `:week` is either an ISO week id (2025-W02) or any date inside the week.
//
// GET  /api/letters/:week                  both letters of the week
// GET  /api/letters/:week/:kind            kind = monday | friday
// PUT  /api/letters/:week/:kind
// POST /api/letters/:week/monday/generate
// POST /api/letters/:week/friday/generate

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::database::LetterKind;
use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::weekly_letter::WeeklyLetter;
use crate::services::letter_service::{FridayGenerateRequest, LetterInput, LetterService, MondayGenerateRequest, WeekLetters};
use crate::state::AppState;

pub async fn week_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(week): Path<String>,
) -> ApiResult<WeekLetters> {
    let service = LetterService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.week(&week).await?))
}

pub async fn letter_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((week, kind)): Path<(String, LetterKind)>,
) -> ApiResult<WeeklyLetter> {
    let service = LetterService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.get(&week, kind).await?))
}

pub async fn letter_put(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path((week, kind)): Path<(String, LetterKind)>,
    Json(input): Json<LetterInput>,
) -> ApiResult<WeeklyLetter> {
    let service = LetterService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.save(&week, kind, input).await?))
}

pub async fn monday_generate_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(week): Path<String>,
    Json(request): Json<MondayGenerateRequest>,
) -> ApiResult<WeeklyLetter> {
    let service = LetterService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.generate_monday(state.ai.as_deref(), &week, request).await?))
}

/// Recap of the Monday letter's activities; 404 until the Monday letter exists.
pub async fn friday_generate_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(week): Path<String>,
    Json(request): Json<FridayGenerateRequest>,
) -> ApiResult<WeeklyLetter> {
    let service = LetterService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.generate_friday(state.ai.as_deref(), &week, request).await?))
}
