use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use posforge_core::TillId;
use posforge_gate::Operation;
use posforge_till::SessionStatus;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/:till/open", post(open_till))
        .route("/:till/session", get(get_open_session))
        .route("/:till/status", get(get_status))
}

fn parse_till(raw: &str) -> Result<TillId, axum::response::Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

/// Session status of a till as seen by the gate: open when the till has an
/// open session, closed otherwise.
pub fn till_session_status(
    services: &AppServices,
    till: TillId,
) -> Result<SessionStatus, axum::response::Response> {
    match services.till.till_status(till) {
        Ok(status) if status.open => Ok(SessionStatus::Open),
        Ok(_) => Ok(SessionStatus::Closed),
        Err(e) => Err(errors::domain_error_to_response(e)),
    }
}

pub async fn open_till(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(till): Path<String>,
    Json(body): Json<dto::OpenTillRequest>,
) -> axum::response::Response {
    let till = match parse_till(&till) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match till_session_status(&services, till) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    if let Err(resp) = services.gate(&ctx, Operation::OpenTill, Some(status)) {
        return resp;
    }

    match services
        .till
        .open_till(till, ctx.actor_id(), ctx.display_name(), body.declared_amount)
        .await
    {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_open_session(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(till): Path<String>,
) -> axum::response::Response {
    let till = match parse_till(&till) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match till_session_status(&services, till) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    if let Err(resp) = services.gate(&ctx, Operation::ViewSession, Some(status)) {
        return resp;
    }

    match services.till.open_session(till) {
        Ok(Some(view)) => (StatusCode::OK, Json(view)).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{till} has no open session"),
        ),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(till): Path<String>,
) -> axum::response::Response {
    let till = match parse_till(&till) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match till_session_status(&services, till) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    if let Err(resp) = services.gate(&ctx, Operation::ViewSession, Some(status)) {
        return resp;
    }

    match services.till.till_status(till) {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
