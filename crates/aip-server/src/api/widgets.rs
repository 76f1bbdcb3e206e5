//! Curated homepage sections and their product membership.

use aip_core::{validate_widget_name, Widget};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use crate::session::Session;

use super::{map_db_error, validation_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct WidgetNameRequest {
    pub widget_name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct WidgetSummary {
    widget_id: i64,
    widget_name: String,
    created_at: DateTime<Utc>,
}

impl From<aip_db::WidgetRow> for WidgetSummary {
    fn from(row: aip_db::WidgetRow) -> Self {
        Self {
            widget_id: row.widget_id,
            widget_name: row.widget_name,
            created_at: row.created_at,
        }
    }
}

/// GET /api/v1/widgets: every widget with its member products.
pub(super) async fn list_widgets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Widget>>>, ApiError> {
    let widgets = aip_db::list_widgets(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(req_id.0, widgets)))
}

/// POST /api/v1/admin/widgets
pub(super) async fn create_widget(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Json(body): Json<WidgetNameRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WidgetSummary>>), ApiError> {
    let rid = &req_id.0;
    let name =
        validate_widget_name(&body.widget_name).map_err(|e| validation_error(rid.clone(), &e))?;

    let row = aip_db::create_widget(&state.pool, &name)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(widget_id = row.widget_id, admin = %session.email, "widget created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, WidgetSummary::from(row))),
    ))
}

/// PATCH /api/v1/admin/widgets/{id}: rename.
pub(super) async fn rename_widget(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path(widget_id): Path<i64>,
    Json(body): Json<WidgetNameRequest>,
) -> Result<Json<ApiResponse<WidgetSummary>>, ApiError> {
    let rid = &req_id.0;
    let name =
        validate_widget_name(&body.widget_name).map_err(|e| validation_error(rid.clone(), &e))?;

    let row = aip_db::rename_widget(&state.pool, widget_id, &name)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(widget_id, admin = %session.email, "widget renamed");
    Ok(Json(ApiResponse::new(req_id.0, WidgetSummary::from(row))))
}

/// DELETE /api/v1/admin/widgets/{id}
pub(super) async fn delete_widget(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path(widget_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = aip_db::delete_widget(&state.pool, widget_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(rid, "not_found", "widget not found"));
    }

    tracing::info!(widget_id, admin = %session.email, "widget deleted");
    Ok(Json(ApiResponse::new(
        req_id.0,
        serde_json::json!({ "deleted": true }),
    )))
}

/// PUT /api/v1/admin/widgets/{id}/products/{product_id}: idempotent add.
pub(super) async fn add_widget_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path((widget_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    aip_db::add_widget_product(&state.pool, widget_id, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(widget_id, product_id, admin = %session.email, "widget member added");
    Ok(Json(ApiResponse::new(
        req_id.0,
        serde_json::json!({ "added": true }),
    )))
}

/// DELETE /api/v1/admin/widgets/{id}/products/{product_id}
pub(super) async fn remove_widget_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path((widget_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = aip_db::remove_widget_product(&state.pool, widget_id, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !removed {
        return Err(ApiError::new(rid, "not_found", "product is not in this widget"));
    }

    tracing::info!(widget_id, product_id, admin = %session.email, "widget member removed");
    Ok(Json(ApiResponse::new(
        req_id.0,
        serde_json::json!({ "removed": true }),
    )))
}
