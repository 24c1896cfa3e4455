use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::database::TenantScope;
use crate::error::ApiError;
use crate::identity::{Principal, TenantContext};
use crate::state::AppState;
use crate::types::Role;

use super::auth::AuthUser;

#[derive(Debug, Default, Deserialize)]
pub struct LocationHint {
    pub location: Option<String>,
}

/// Resolves the authenticated principal to tenant coordinates and injects a
/// `TenantContext`. Must run after `jwt_auth_middleware`.
pub async fn resolve_tenant_middleware(
    State(state): State<AppState>,
    Query(hint): Query<LocationHint>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request.extensions().get::<AuthUser>().map(Principal::from);
    let hint = hint.location.as_deref().map(str::trim).filter(|h| !h.is_empty());

    let coordinates = state
        .resolver
        .resolve(principal.as_ref(), hint)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    let principal = principal.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    // Owners address locations by hint; the location must exist in their own organization.
    if coordinates.role == Role::Owner && coordinates.has_location() {
        let location = TenantScope::new(&coordinates.organization_id, &coordinates.location_id)?.location()?;
        if state.store.get(&location).await?.is_none() {
            tracing::warn!(
                "Owner {} asked for unknown location '{}'",
                principal.uid,
                coordinates.location_id
            );
            return Err(ApiError::not_found(format!("Location '{}' not found", coordinates.location_id)));
        }
    }

    request.extensions_mut().insert(TenantContext::new(principal, coordinates));

    Ok(next.run(request).await)
}

/// Elevated tier: only organization owners pass.
pub async fn require_owner_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let context = request
        .extensions()
        .get::<TenantContext>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if context.role() != Role::Owner {
        tracing::warn!("{} ({}) denied access to {}", context.uid(), context.role().as_str(), request.uri().path());
        return Err(ApiError::forbidden("Only the organization owner may access this resource"));
    }

    Ok(next.run(request).await)
}
