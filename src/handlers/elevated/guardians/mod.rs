// handlers/elevated/guardians/mod.rs - Guardian accounts
//
// GET, POST /api/admin/guardians
// DELETE    /api/admin/guardians/:uid

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::registry::GuardianRecord;
use crate::services::registry_service::{GuardianRequest, RegistryEntry, RegistryService};
use crate::state::AppState;

pub async fn guardians_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> ApiResult<Vec<RegistryEntry<GuardianRecord>>> {
    let service = RegistryService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.list_guardians().await?))
}

/// The child (`copilCnp`) must already be enrolled in the location.
pub async fn guardians_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(request): Json<GuardianRequest>,
) -> ApiResult<RegistryEntry<GuardianRecord>> {
    let service = RegistryService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.create_guardian(request).await?))
}

pub async fn guardian_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(uid): Path<String>,
) -> ApiResult<()> {
    let service = RegistryService::new(state.store.clone(), ctx)?;
    service.remove_guardian(&uid).await?;
    Ok(ApiResponse::no_content())
}
