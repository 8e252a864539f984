use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use posforge_core::DomainError;
use posforge_gate::DenyReason;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvalidState(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_state", msg)
        }
        DomainError::Busy => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "busy",
            "the till is busy, retry shortly",
        ),
    }
}

pub fn deny_to_response(reason: DenyReason) -> axum::response::Response {
    match reason {
        DenyReason::MissingCapability(cap) => json_error(
            StatusCode::FORBIDDEN,
            "missing_capability",
            format!("requires the {cap} capability"),
        ),
        DenyReason::SessionClosed => json_error(
            StatusCode::FORBIDDEN,
            "session_closed",
            "the till session is closed",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
