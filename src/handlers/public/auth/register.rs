// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::State, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::registry_service::{AuthService, LoginResponse, RegisterRequest};
use crate::state::AppState;

/**
 * POST /auth/register - Create an owner account and its organization
 *
 * Expected Input:
 * ```json
 * {
 *   "email": "elena@gradinita.ro",
 *   "password": "at least 8 characters",
 *   "displayName": "Elena",            // Optional
 *   "organizationName": "Grădinița Soare",
 *   "facilityType": "kindergarten"     // Optional: kindergarten | elder_care | hospital | hotel
 * }
 * ```
 *
 * Answers 201 with the same body as /auth/login; 409 when the email is taken.
 */
pub async fn register_post(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> ApiResult<LoginResponse> {
    let auth = AuthService::new(state.store.clone(), state.jwt_secret.clone(), state.jwt_expiry_hours);
    Ok(ApiResponse::created(auth.register_owner(request).await?))
}
