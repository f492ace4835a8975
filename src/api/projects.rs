use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;

use super::validation::{validate_id, validate_required};
use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{CreateProjectRequest, ProjectDto};
use crate::db::NewProject;

/// GET /api/projects
/// Public, newest first, always an array.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProjectDto>>>, ApiError> {
    let projects = state.store().list_projects().await?;
    let dtos: Vec<ProjectDto> = projects.into_iter().map(ProjectDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/admin/project
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectDto>>), ApiError> {
    let title = validate_required("title", &payload.title)?.to_string();
    let description = validate_required("description", &payload.description)?.to_string();

    let project = state
        .store()
        .create_project(NewProject {
            title,
            description,
            tech_stack: payload.tech_stack,
            image_url: payload.image_url,
            live_link: payload.live_link,
            repo_link: payload.repo_link,
        })
        .await?;

    info!("Project created: {} (id {})", project.title, project.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ProjectDto::from(project))),
    ))
}

/// DELETE /api/admin/project/{id}
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let id = validate_id(id)?;

    if state.store().delete_project(id).await? {
        info!("Project deleted: {id}");
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Project", id))
    }
}
