use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;

use super::validation::{validate_id, validate_required};
use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{CertificateDto, CreateCertificateRequest};
use crate::db::NewCertificate;

/// GET /api/certificates
pub async fn list_certificates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CertificateDto>>>, ApiError> {
    let certificates = state.store().list_certificates().await?;
    let dtos: Vec<CertificateDto> = certificates
        .into_iter()
        .map(CertificateDto::from)
        .collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/admin/certificate
pub async fn create_certificate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCertificateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CertificateDto>>), ApiError> {
    let title = validate_required("title", &payload.title)?.to_string();
    let issuer = validate_required("issuer", &payload.issuer)?.to_string();

    let certificate = state
        .store()
        .create_certificate(NewCertificate {
            title,
            issuer,
            issue_date: payload.issue_date,
            skills: payload.skills,
            cert_url: payload.cert_url,
        })
        .await?;

    info!(
        "Certificate created: {} (id {})",
        certificate.title, certificate.id
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CertificateDto::from(certificate))),
    ))
}

/// DELETE /api/admin/certificate/{id}
pub async fn delete_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let id = validate_id(id)?;

    if state.store().delete_certificate(id).await? {
        info!("Certificate deleted: {id}");
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Certificate", id))
    }
}
