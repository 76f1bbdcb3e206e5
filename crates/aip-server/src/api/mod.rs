mod auth;
mod products;
mod slides;
mod uploads;
mod widgets;

use std::sync::Arc;
use std::time::Duration;

use aip_core::ValidationError;
use aip_db::DbError;
use aip_media::MediaClient;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_session, RateLimitState, RequestId,
};
use crate::session::SessionStore;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: SessionStore,
    /// `None` when no media credentials are configured.
    pub media: Option<Arc<MediaClient>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &DbError) -> ApiError {
    match error {
        DbError::NotFound => ApiError::new(request_id, "not_found", "record not found"),
        DbError::ColorDecode { product_id, .. } => {
            tracing::error!(product_id, error = %error, "stored product colors are malformed");
            ApiError::new(request_id, "internal_error", "stored product data is malformed")
        }
        _ => {
            tracing::error!(error = %error, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

/// Like [`map_db_error`], but reports unique violations as `conflict`.
pub(super) fn map_write_error(request_id: String, error: &DbError, conflict: &str) -> ApiError {
    if error.is_unique_violation() {
        return ApiError::new(request_id, "conflict", conflict);
    }
    map_db_error(request_id, error)
}

pub(super) fn validation_error(request_id: String, error: &ValidationError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{name}", get(products::get_product))
        .route("/api/v1/slides", get(slides::list_slides))
        .route("/api/v1/widgets", get(widgets::list_widgets))
}

fn credentials_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/sign-in", post(auth::sign_in))
        .route("/api/v1/auth/sign-up", post(auth::sign_up))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

fn session_router(sessions: SessionStore) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/session", get(auth::current_session))
        .route("/api/v1/auth/sign-out", post(auth::sign_out))
        .route("/api/v1/admin/products", post(products::create_product))
        .route(
            "/api/v1/admin/products/{id}",
            patch(products::update_product).delete(products::delete_product),
        )
        .route("/api/v1/admin/slides", post(slides::create_slide))
        .route(
            "/api/v1/admin/slides/{id}",
            patch(slides::update_slide).delete(slides::delete_slide),
        )
        .route("/api/v1/admin/widgets", post(widgets::create_widget))
        .route(
            "/api/v1/admin/widgets/{id}",
            patch(widgets::rename_widget).delete(widgets::delete_widget),
        )
        .route(
            "/api/v1/admin/widgets/{id}/products/{product_id}",
            put(widgets::add_widget_product).delete(widgets::remove_widget_product),
        )
        .route(
            "/api/v1/admin/uploads",
            post(uploads::upload_media).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(axum::middleware::from_fn_with_state(
            sessions,
            require_session,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .merge(public_router())
        .merge(credentials_router(rate_limit))
        .merge(session_router(state.sessions.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match aip_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

/// Limit applied to the sign-in and sign-up endpoints.
pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(20, Duration::from_secs(60))
}

#[cfg(test)]
mod tests;
