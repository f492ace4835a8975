use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{ProfileDto, UpdateProfileRequest};

/// GET /api/profile
/// Public read of the single profile row; a default empty row is created on
/// first read so this never 404s.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile = state.store().get_profile().await?;
    Ok(Json(ApiResponse::success(ProfileDto::from(profile))))
}

/// PUT /api/admin/profile
/// Upsert through the allow-list: fields outside `UpdateProfileRequest`
/// (role, password, anything else) are dropped before this handler runs.
/// Single-row write, last-write-wins under concurrency.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile = state.store().update_profile(payload.into()).await?;

    info!("Profile updated");

    Ok(Json(ApiResponse::success(ProfileDto::from(profile))))
}
