// handlers/protected/children/collection.rs - GET/POST /api/children

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::child_service::{ChildFilter, ChildService, ChildView, EnrollRequest};
use crate::state::AppState;

/// GET /api/children?grupaId= - children of the location (a guardian sees only their own)
pub async fn children_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(filter): Query<ChildFilter>,
) -> ApiResult<Vec<ChildView>> {
    let service = ChildService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.list(filter).await?))
}

/**
 * POST /api/children - Enroll a child
 *
 * The CNP is validated (length, control digit, birth date) and becomes the
 * document id; the birth date and sex are derived from it. `grupaId` must
 * name a group of the location. An already enrolled CNP answers 409.
 */
pub async fn children_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(request): Json<EnrollRequest>,
) -> ApiResult<ChildView> {
    let service = ChildService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.enroll(request).await?))
}
