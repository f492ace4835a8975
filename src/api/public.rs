use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{CertificateDto, ProfileDto, ProjectDto, PublicDataDto};

/// GET /api/data/all-public-data
/// One round trip for the landing page: profile plus both collections,
/// newest first. Collections are always arrays, even when empty.
pub async fn get_public_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<PublicDataDto>>, ApiError> {
    let profile = state.store().get_profile().await?;
    let projects = state.store().list_projects().await?;
    let certificates = state.store().list_certificates().await?;

    Ok(Json(ApiResponse::success(PublicDataDto {
        profile: ProfileDto::from(profile),
        projects: projects.into_iter().map(ProjectDto::from).collect(),
        certificates: certificates
            .into_iter()
            .map(CertificateDto::from)
            .collect(),
    })))
}
