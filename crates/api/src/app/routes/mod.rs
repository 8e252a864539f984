use axum::{routing::get, Router};

pub mod capabilities;
pub mod config;
pub mod movements;
pub mod system;
pub mod till;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/capabilities", capabilities::router())
        .nest("/actors", capabilities::actors_router())
        .nest("/till", till::router())
        .nest("/sessions", movements::sessions_router())
        .nest("/movements", movements::router())
        .nest("/config", config::router())
}
