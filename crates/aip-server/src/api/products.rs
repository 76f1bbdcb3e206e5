//! Catalog listing, product detail and admin product writes.

use aip_core::{CatalogFilters, MediaItem, Product, ProductDraft, ProductPage, ProductPatch};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use crate::session::Session;

use super::{map_db_error, map_write_error, validation_error, ApiError, ApiResponse, AppState};

const DUPLICATE_NAME: &str = "a product with that name already exists";

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Query string of `GET /api/v1/products`. Every filter is raw text; see
/// [`CatalogFilters::to_query`] for how blanks and bad numbers are treated.
#[derive(Debug, Default, Deserialize)]
pub(super) struct CatalogParams {
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub page: Option<u32>,
}

impl CatalogParams {
    fn filters(&self) -> CatalogFilters {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        CatalogFilters {
            search: text(&self.search),
            min_price: text(&self.min_price),
            max_price: text(&self.max_price),
            size: text(&self.size),
            color: text(&self.color),
        }
    }
}

/// A product plus the values the detail page derives from it.
#[derive(Debug, Serialize)]
pub(super) struct ProductDetail {
    #[serde(flatten)]
    product: Product,
    primary_image: Option<String>,
    effective_price: Decimal,
    media: Vec<MediaItem>,
}

impl From<Product> for ProductDetail {
    fn from(product: Product) -> Self {
        Self {
            primary_image: product.primary_image().map(str::to_owned),
            effective_price: product.effective_price(),
            media: product.media(),
            product,
        }
    }
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/products: one filtered catalog page, newest first.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<ApiResponse<ProductPage>>, ApiError> {
    let page = params.page.unwrap_or(0);
    let query = params.filters().to_query();

    let items = aip_db::list_catalog_page(&state.pool, &query, page)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, ProductPage::new(items, page))))
}

/// GET /api/v1/products/{name}
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let rid = &req_id.0;
    let product = aip_db::get_product_by_name(&state.pool, &name)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("product '{name}' not found")))?;

    Ok(Json(ApiResponse::new(req_id.0, ProductDetail::from(product))))
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/products
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Json(mut body): Json<ProductDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = &req_id.0;
    body.validate().map_err(|e| validation_error(rid.clone(), &e))?;

    let product = aip_db::create_product(&state.pool, &body)
        .await
        .map_err(|e| map_write_error(rid.clone(), &e, DUPLICATE_NAME))?;

    tracing::info!(
        product_id = product.product_id,
        admin = %session.email,
        "product created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, product)),
    ))
}

/// PATCH /api/v1/admin/products/{id}: sparse update.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path(product_id): Path<i64>,
    Json(mut body): Json<ProductPatch>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;
    body.validate().map_err(|e| validation_error(rid.clone(), &e))?;

    let product = aip_db::update_product(&state.pool, product_id, &body)
        .await
        .map_err(|e| map_write_error(rid.clone(), &e, DUPLICATE_NAME))?;

    tracing::info!(product_id, admin = %session.email, "product updated");
    Ok(Json(ApiResponse::new(req_id.0, product)))
}

/// DELETE /api/v1/admin/products/{id}
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = aip_db::delete_product(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(rid, "not_found", "product not found"));
    }

    tracing::info!(product_id, admin = %session.email, "product deleted");
    Ok(Json(ApiResponse::new(
        req_id.0,
        serde_json::json!({ "deleted": true }),
    )))
}
