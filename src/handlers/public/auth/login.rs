// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::registry_service::{AuthService, LoginRequest, LoginResponse};
use crate::state::AppState;

/**
 * POST /auth/login - Authenticate with email and password, receive a JWT
 *
 * Expected Input:
 * ```json
 * { "email": "ioana@gradinita.ro", "password": "..." }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "token": "eyJhbGciOiJIUzI1NiI...",
 *     "user": { "uid": "...", "email": "...", "displayName": "..." },
 *     "expiresIn": 86400
 *   }
 * }
 * ```
 *
 * Unknown email and wrong password both answer 401 with the same message.
 */
pub async fn login_post(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let auth = AuthService::new(state.store.clone(), state.jwt_secret.clone(), state.jwt_expiry_hours);
    Ok(ApiResponse::success(auth.login(request).await?))
}
