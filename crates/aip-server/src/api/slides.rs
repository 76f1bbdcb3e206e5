use aip_core::{Slide, SlideDraft, SlidePatch};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::middleware::RequestId;
use crate::session::Session;

use super::{map_db_error, validation_error, ApiError, ApiResponse, AppState};

/// GET /api/v1/slides: hero banner entries in display order.
pub(super) async fn list_slides(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Slide>>>, ApiError> {
    let slides = aip_db::list_slides(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(req_id.0, slides)))
}

/// POST /api/v1/admin/slides
pub(super) async fn create_slide(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Json(mut body): Json<SlideDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Slide>>), ApiError> {
    let rid = &req_id.0;
    body.validate().map_err(|e| validation_error(rid.clone(), &e))?;

    let slide = aip_db::create_slide(&state.pool, &body)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(slide_id = slide.id, admin = %session.email, "slide created");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(req_id.0, slide))))
}

/// PATCH /api/v1/admin/slides/{id}
pub(super) async fn update_slide(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    Json(mut body): Json<SlidePatch>,
) -> Result<Json<ApiResponse<Slide>>, ApiError> {
    let rid = &req_id.0;
    body.validate().map_err(|e| validation_error(rid.clone(), &e))?;

    let slide = aip_db::update_slide(&state.pool, id, &body)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(slide_id = id, admin = %session.email, "slide updated");
    Ok(Json(ApiResponse::new(req_id.0, slide)))
}

/// DELETE /api/v1/admin/slides/{id}
pub(super) async fn delete_slide(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = aip_db::delete_slide(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(rid, "not_found", "slide not found"));
    }

    tracing::info!(slide_id = id, admin = %session.email, "slide deleted");
    Ok(Json(ApiResponse::new(
        req_id.0,
        serde_json::json!({ "deleted": true }),
    )))
}
