use crate::application::ServiceError;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;

pub(super) fn map_service_error(err: &ServiceError) -> (StatusCode, serde_json::Value) {
    match err {
        ServiceError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "error": "Invalid credentials or token" }),
        ),
        ServiceError::Forbidden => (
            StatusCode::FORBIDDEN,
            serde_json::json!({ "error": "Access denied" }),
        ),
        ServiceError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": format!("Not found: {}", what) }),
        ),
        ServiceError::Conflict(msg) => (StatusCode::CONFLICT, serde_json::json!({ "error": msg })),
        ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg })),
        ServiceError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": "Internal server error" }),
        ),
    }
}

/// Maps to a response; internal causes are logged here and never returned.
pub(super) fn error_response(err: &ServiceError, action: &str) -> (StatusCode, Json<serde_json::Value>) {
    if let ServiceError::Internal(cause) = err {
        error!(error = %cause, action, "Request failed");
    }
    let (status, body) = map_service_error(err);
    (status, Json(body))
}
