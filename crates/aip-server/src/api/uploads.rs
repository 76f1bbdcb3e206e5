//! Admin media upload, forwarded to the hosted media service.

use aip_core::products::is_video_url;
use aip_core::MediaKind;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::session::Session;

use super::{ApiError, ApiResponse, AppState, MAX_UPLOAD_BYTES};

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub(super) struct UploadedMedia {
    url: String,
    kind: MediaKind,
}

fn multipart_error(request_id: String, error: &MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(
            request_id,
            "payload_too_large",
            format!("uploads are limited to {} MiB", MAX_UPLOAD_BYTES / (1024 * 1024)),
        );
    }
    tracing::warn!(error = %error, "invalid multipart upload");
    ApiError::new(request_id, "bad_request", "invalid multipart data")
}

/// POST /api/v1/admin/uploads: multipart field `file`.
pub(super) async fn upload_media(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadedMedia>>), ApiError> {
    let rid = &req_id.0;
    let Some(media) = state.media.clone() else {
        return Err(ApiError::new(
            rid,
            "service_unavailable",
            "media uploads are not configured",
        ));
    };

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(rid.clone(), &e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(rid.clone(), &e))?;
        upload = Some((file_name, content_type, bytes));
        break;
    }

    let Some((file_name, content_type, bytes)) = upload else {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "file: multipart field is required",
        ));
    };
    if bytes.is_empty() {
        return Err(ApiError::new(rid, "validation_error", "file: must not be empty"));
    }

    let size = bytes.len();
    let url = media
        .upload(bytes.to_vec(), &file_name, content_type.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, file_name = %file_name, "media upload failed");
            ApiError::new(rid, "upstream_error", "media upload failed")
        })?;

    tracing::info!(size, admin = %session.email, url = %url, "media uploaded by admin");
    let kind = if is_video_url(&file_name) || is_video_url(&url) {
        MediaKind::Video
    } else {
        MediaKind::Image
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, UploadedMedia { url, kind })),
    ))
}
