use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use posforge_auth::{resolve, ActorSource};
use posforge_core::ActorId;

use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub actors: Arc<dyn ActorSource>,
}

/// Bearer token is the actor id; the actor record and resolved capability
/// set are attached to the request for handlers and the gate.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let actor_id: ActorId = token.parse().map_err(|_| StatusCode::UNAUTHORIZED)?;
    let actor = state
        .actors
        .get_actor(actor_id)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let capabilities = resolve(&actor);
    req.extensions_mut()
        .insert(ActorContext::new(actor, capabilities));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
