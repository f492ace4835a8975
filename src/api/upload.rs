use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::UploadResponse;

/// Per-route body cap; uploads carry documents and images, not video.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// What the caller is uploading. Declared explicitly in the query string
/// and checked against this enum at deserialization; the multipart field
/// name plays no part in classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadIntent {
    Resume,
    ProjectImage,
    Certificate,
    Misc,
}

impl UploadIntent {
    /// Storage folder at the media host. A namespacing convention, not a
    /// security boundary.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Resume => "resumes",
            Self::ProjectImage => "projects",
            Self::Certificate => "certificates",
            Self::Misc => "misc",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub intent: Option<UploadIntent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
    Pdf,
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl AssetKind {
    const fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Classify by content, not by client-declared type or filename.
fn sniff_asset_kind(bytes: &[u8]) -> Option<AssetKind> {
    match bytes {
        [0x25, 0x50, 0x44, 0x46, 0x2D, ..] => Some(AssetKind::Pdf),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(AssetKind::Png),
        [0xFF, 0xD8, 0xFF, ..] => Some(AssetKind::Jpeg),
        [0x47, 0x49, 0x46, 0x38, ..] => Some(AssetKind::Gif),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some(AssetKind::Webp),
        _ => None,
    }
}

/// Destination object name: sanitized original base + upload instant, with
/// the extension dictated by the sniffed kind. PDFs always end in `.pdf` so
/// downstream viewers negotiate the content type correctly.
fn destination_name(original: &str, kind: AssetKind, uploaded_at_millis: i64) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");

    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    let stem = if stem.is_empty() {
        "upload".to_string()
    } else {
        stem
    };

    format!("{stem}-{uploaded_at_millis}.{}", kind.extension())
}

/// POST /api/upload?intent=...
/// Accept exactly one file part (first file part wins), forward it to the
/// media host, and return the durable URL. Admin-gated by the router.
pub async fn upload_asset(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let intent = query.intent.unwrap_or(UploadIntent::Misc);

    // Walk the parts until the first one that carries a file; anything
    // after it is ignored.
    let (original_name, bytes) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?;

        let Some(field) = field else {
            return Err(ApiError::validation("No file part in upload request"));
        };

        let Some(name) = field.file_name().map(ToString::to_string) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read file data: {e}")))?;

        break (name, bytes);
    };

    if bytes.is_empty() {
        return Err(ApiError::validation("Uploaded file is empty"));
    }

    let Some(kind) = sniff_asset_kind(&bytes) else {
        return Err(ApiError::validation(
            "Unsupported file type. Allowed: PDF, PNG, JPEG, GIF, WebP",
        ));
    };

    let object_name = destination_name(
        &original_name,
        kind,
        chrono::Utc::now().timestamp_millis(),
    );

    let url = state
        .media
        .upload(intent.folder(), &object_name, kind.mime(), bytes.to_vec())
        .await
        .map_err(|e| ApiError::storage_error(e.to_string()))?;

    info!(
        folder = intent.folder(),
        object_name, "Asset stored at media host"
    );

    Ok(Json(ApiResponse::success(UploadResponse { url })))
}
