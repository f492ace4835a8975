use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
};
use std::sync::Arc;
use tracing::info;

use super::rate_limit::ClientIp;
use super::validation::{validate_email, validate_id, validate_required};
use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{ContactRequest, MessageDto};
use crate::db::NewMessage;

/// POST /api/contact
/// Public submission. Subject falls back to the configured placeholder;
/// submitter IP and user agent are stored as write-only metadata.
pub async fn submit_message(
    State(state): State<Arc<AppState>>,
    Extension(ClientIp(ip)): Extension<ClientIp>,
    headers: HeaderMap,
    Json(payload): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageDto>>), ApiError> {
    let name = validate_required("name", &payload.name)?.to_string();
    let email = validate_email(&payload.email)?.to_string();
    let message = validate_required("message", &payload.message)?.to_string();

    if message.len() > state.config.contact.max_message_length {
        return Err(ApiError::validation(format!(
            "message must be at most {} characters",
            state.config.contact.max_message_length
        )));
    }

    let subject = payload
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(
            || state.config.contact.default_subject.clone(),
            ToString::to_string,
        );

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let stored = state
        .store()
        .add_contact_message(NewMessage {
            name,
            email,
            subject,
            message,
            ip_address: ip.map(|addr| addr.to_string()),
            user_agent,
        })
        .await?;

    info!("Contact message received (id {})", stored.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MessageDto::from(stored))),
    ))
}

/// GET /api/admin/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, ApiError> {
    let messages = state.store().list_contact_messages().await?;
    let dtos: Vec<MessageDto> = messages.into_iter().map(MessageDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// DELETE /api/admin/messages/{id}
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let id = validate_id(id)?;

    if state.store().delete_contact_message(id).await? {
        info!("Contact message deleted: {id}");
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Message", id))
    }
}
