use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use posforge_auth::{Actor, Role};
use posforge_core::ActorId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/me", get(my_capabilities))
}

/// Actor administration. Supervisor-only: capability flags never change
/// outside this surface.
pub fn actors_router() -> Router {
    Router::new()
        .route("/", get(list_actors).post(register_actor))
        .route("/:id/capabilities", put(update_capabilities))
}

pub async fn my_capabilities(Extension(ctx): Extension<ActorContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "actor_id": ctx.actor_id().to_string(),
        "supervisor": ctx.capabilities().is_supervisor(),
        "capabilities": ctx.capabilities().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
    }))
}

fn ensure_supervisor(ctx: &ActorContext) -> Result<(), axum::response::Response> {
    if ctx.capabilities().is_supervisor() {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "supervisor_only",
            "actor administration requires a supervisor",
        ))
    }
}

pub async fn list_actors(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(resp) = ensure_supervisor(&ctx) {
        return resp;
    }
    match services.actors.list() {
        Ok(actors) => {
            let items = actors.iter().map(dto::actor_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn register_actor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::RegisterActorRequest>,
) -> axum::response::Response {
    if let Err(resp) = ensure_supervisor(&ctx) {
        return resp;
    }

    let actor = match body.role {
        Role::Supervisor => Actor::supervisor(ActorId::new(), body.display_name, Utc::now()),
        Role::Employee => Actor::employee(ActorId::new(), body.display_name, body.granted, Utc::now()),
    };

    match services.actors.register(actor.clone()) {
        Ok(()) => (StatusCode::CREATED, Json(dto::actor_to_json(&actor))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_capabilities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCapabilitiesRequest>,
) -> axum::response::Response {
    if let Err(resp) = ensure_supervisor(&ctx) {
        return resp;
    }

    let actor_id: ActorId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.actors.update_capabilities(actor_id, body.granted) {
        Ok(actor) => (StatusCode::OK, Json(dto::actor_to_json(&actor))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
