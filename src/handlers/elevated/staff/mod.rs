// handlers/elevated/staff/mod.rs - Staff accounts
//
// GET, POST /api/admin/staff
// DELETE    /api/admin/staff/:uid

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::registry::StaffRecord;
use crate::services::registry_service::{RegistryEntry, RegistryService, StaffRequest};
use crate::state::AppState;

pub async fn staff_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> ApiResult<Vec<RegistryEntry<StaffRecord>>> {
    let service = RegistryService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.list_staff().await?))
}

/**
 * POST /api/admin/staff - Create a staff login bound to one location
 *
 * ```json
 * { "email": "...", "password": "...", "name": "Ioana", "locationId": "...", "grupaId": "optional" }
 * ```
 *
 * From the next request on, the account resolves to that location as staff.
 */
pub async fn staff_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(request): Json<StaffRequest>,
) -> ApiResult<RegistryEntry<StaffRecord>> {
    let service = RegistryService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.create_staff(request).await?))
}

pub async fn staff_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(uid): Path<String>,
) -> ApiResult<()> {
    let service = RegistryService::new(state.store.clone(), ctx)?;
    service.remove_staff(&uid).await?;
    Ok(ApiResponse::no_content())
}
