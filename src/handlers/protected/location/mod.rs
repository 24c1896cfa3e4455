// handlers/protected/location/mod.rs - GET /api/location

use axum::{extract::State, Extension};

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::location::Location;
use crate::services::location_service::LocationService;
use crate::state::AppState;

/// GET /api/location - the caller's current location with its groups
pub async fn location_get(State(state): State<AppState>, Extension(ctx): Extension<TenantContext>) -> ApiResult<Location> {
    let service = LocationService::new(state.store.clone(), ctx);
    Ok(ApiResponse::success(service.current().await?))
}
