//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (store, till service, directories)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use posforge_auth::ActorSource;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        actors: services.actors.clone() as Arc<dyn ActorSource>,
    };

    // Protected routes: require an authenticated actor.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
