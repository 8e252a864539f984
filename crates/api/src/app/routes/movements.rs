use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use posforge_core::SessionId;
use posforge_gate::Operation;
use posforge_infra::{NewMovement, SessionView};
use posforge_till::HistoryFilter;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn sessions_router() -> Router {
    Router::new()
        .route("/:id", get(get_session))
        .route("/:id/balance", get(get_balance))
        .route("/:id/movements", post(record_movement).get(list_movements))
        .route("/:id/close", post(close_session))
}

pub fn router() -> Router {
    Router::new().route("/", get(history))
}

/// Resolve the session view up front: 404 before the gate for unknown ids,
/// then the session's own status feeds the gate decision.
fn load_session(
    services: &AppServices,
    raw_id: &str,
) -> Result<SessionView, axum::response::Response> {
    let session_id: SessionId = raw_id.parse().map_err(errors::domain_error_to_response)?;
    services
        .till
        .session(session_id)
        .map_err(errors::domain_error_to_response)
}

pub async fn get_session(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let view = match load_session(&services, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = services.gate(&ctx, Operation::ViewSession, Some(view.status)) {
        return resp;
    }
    (StatusCode::OK, Json(view)).into_response()
}

pub async fn get_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let view = match load_session(&services, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = services.gate(&ctx, Operation::ViewBalance, Some(view.status)) {
        return resp;
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "session_id": view.session_id,
            "balance": view.balance,
        })),
    )
        .into_response()
}

pub async fn record_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<NewMovement>,
) -> axum::response::Response {
    let view = match load_session(&services, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = services.gate(&ctx, Operation::RecordMovement, Some(view.status)) {
        return resp;
    }

    match services
        .till
        .record_movement(view.session_id, ctx.actor_id(), ctx.display_name(), body)
        .await
    {
        Ok(movement) => (StatusCode::CREATED, Json(movement)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn close_session(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CloseSessionRequest>,
) -> axum::response::Response {
    let view = match load_session(&services, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = services.gate(&ctx, Operation::CloseTill, Some(view.status)) {
        return resp;
    }

    match services
        .till
        .close_session(
            view.session_id,
            ctx.actor_id(),
            ctx.display_name(),
            body.counted_amount,
        )
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Query(mut filter): Query<HistoryFilter>,
) -> axum::response::Response {
    let view = match load_session(&services, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = services.gate(&ctx, Operation::ViewMovements, Some(view.status)) {
        return resp;
    }

    filter.session_id = Some(view.session_id);
    match services.till.history(&filter) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Global movement history across sessions and tills.
pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<HistoryFilter>,
) -> axum::response::Response {
    // Not tied to one drawer, so no session status to weigh.
    if let Err(resp) = services.gate(&ctx, Operation::ViewHistory, None) {
        return resp;
    }

    match services.till.history(&filter) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
