use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<ActorContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "actor_id": ctx.actor_id().to_string(),
        "display_name": ctx.display_name(),
        "role": ctx.actor().role.to_string(),
        "supervisor": ctx.capabilities().is_supervisor(),
    }))
}
