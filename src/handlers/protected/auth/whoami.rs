// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::{extract::State, Extension};

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::registry_service::{whoami, WhoAmI};
use crate::state::AppState;

/**
 * GET /api/auth/whoami - Resolved identity of the caller
 *
 * Returns the role, tenant coordinates (organization, location, group or
 * child) and the facility-specific nouns the UI should use.
 */
pub async fn whoami_get(State(state): State<AppState>, Extension(ctx): Extension<TenantContext>) -> ApiResult<WhoAmI> {
    Ok(ApiResponse::success(whoami(&state.store, &ctx).await?))
}
