//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{ErrorResponse, HealthResponse, SecretsResponse};
use common::ServiceError;
use tracing::debug;

use super::state::AppState;

/// `GET /secrets`: return the secrets from the decrypted settings file.
///
/// Returns `503 Service Unavailable` until settings have been published.
pub async fn secrets(State(state): State<AppState>) -> Response {
    match state.secrets.current() {
        Ok(secrets) => {
            let body = SecretsResponse {
                secrets: (*secrets).clone(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            debug!(error = %e, "secrets requested before settings were loaded");
            error_response(&ServiceError::Unavailable(e.to_string()))
        }
    }
}

/// `GET /health`: liveness and readiness check.
///
/// Returns `200 OK` once settings are loaded and `503 Service Unavailable`
/// before that.
pub async fn health(State(state): State<AppState>) -> Response {
    let settings_loaded = state.secrets.is_loaded();

    let (status_code, status_str) = if settings_loaded {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        settings_loaded,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> Response {
    error_response(&ServiceError::NotFound(
        "the requested resource does not exist".into(),
    ))
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::new(err.code(), err.to_string());
    (status, Json(body)).into_response()
}
