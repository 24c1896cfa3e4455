// handlers/protected/messages/mod.rs - Staff/guardian messaging
//
// GET  /api/messages            inbox
// POST /api/messages            new thread
// GET  /api/messages/sent
// GET  /api/messages/unread     unread count
// GET  /api/messages/:id/thread whole thread, oldest first; marks viewer's messages read
// POST /api/messages/:id/reply

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::identity::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::message::Message;
use crate::services::message_service::{MessageService, NewMessage, ReplyRequest};
use crate::state::AppState;

pub async fn inbox_get(State(state): State<AppState>, Extension(ctx): Extension<TenantContext>) -> ApiResult<Vec<Message>> {
    let service = MessageService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.inbox().await?))
}

pub async fn sent_get(State(state): State<AppState>, Extension(ctx): Extension<TenantContext>) -> ApiResult<Vec<Message>> {
    let service = MessageService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.sent().await?))
}

pub async fn unread_get(State(state): State<AppState>, Extension(ctx): Extension<TenantContext>) -> ApiResult<Value> {
    let service = MessageService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(json!({ "unread": service.unread_count().await? })))
}

/**
 * POST /api/messages - Start a thread
 *
 * ```json
 * { "recipientId": "uid", "subject": "...", "body": "...", "childCnp": "optional" }
 * ```
 *
 * The recipient must belong to the caller's location. The created message is
 * its own thread root (`threadId == id`).
 */
pub async fn message_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(request): Json<NewMessage>,
) -> ApiResult<Message> {
    let service = MessageService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.send(request).await?))
}

pub async fn thread_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Message>> {
    let service = MessageService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::success(service.thread(&id).await?))
}

pub async fn reply_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(request): Json<ReplyRequest>,
) -> ApiResult<Message> {
    let service = MessageService::new(state.store.clone(), ctx)?;
    Ok(ApiResponse::created(service.reply(&id, request).await?))
}
