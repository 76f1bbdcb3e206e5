use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::middleware::RequestId;
use crate::session::{AuthError, Session};

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Deserialize)]
pub(super) struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

fn map_auth_error(request_id: String, error: &AuthError) -> ApiError {
    match error {
        AuthError::InvalidCredentials => {
            ApiError::new(request_id, "unauthorized", error.to_string())
        }
        AuthError::SignUpDisabled => ApiError::new(request_id, "forbidden", error.to_string()),
        AuthError::EmailTaken => ApiError::new(request_id, "conflict", error.to_string()),
        AuthError::InvalidInput(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        AuthError::Db(e) => map_db_error(request_id, e),
        AuthError::Hash(_) | AuthError::Task(_) => {
            tracing::error!(error = %error, "password hashing failed");
            ApiError::new(request_id, "internal_error", "could not process credentials")
        }
    }
}

/// POST /api/v1/auth/sign-in
pub(super) async fn sign_in(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    let session = state
        .sessions
        .sign_in(&body.email, &body.password)
        .await
        .map_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::warn!(email = %body.email, "sign-in rejected");
            }
            map_auth_error(req_id.0.clone(), &e)
        })?;
    Ok(Json(ApiResponse::new(req_id.0, session)))
}

/// POST /api/v1/auth/sign-up: only when enabled in config.
pub(super) async fn sign_up(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Session>>), ApiError> {
    let session = state
        .sessions
        .sign_up(&body.email, &body.password)
        .await
        .map_err(|e| map_auth_error(req_id.0.clone(), &e))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(req_id.0, session))))
}

/// GET /api/v1/auth/session: the caller's live session.
pub(super) async fn current_session(
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
) -> Json<ApiResponse<Session>> {
    Json(ApiResponse::new(req_id.0, session))
}

/// POST /api/v1/auth/sign-out
pub(super) async fn sign_out(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
) -> Json<ApiResponse<serde_json::Value>> {
    let signed_out = state.sessions.sign_out(&session.token).await;
    Json(ApiResponse::new(
        req_id.0,
        serde_json::json!({ "signed_out": signed_out }),
    ))
}
