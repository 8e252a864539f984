use std::sync::Arc;

use chrono::Utc;
use posforge_auth::Actor;
use posforge_core::ActorId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    posforge_observability::init();

    let services = Arc::new(posforge_api::app::services::build_services());

    // Dev bootstrap: without a seeded supervisor there is no way to register
    // actors through the API.
    let supervisor = Actor::supervisor(ActorId::new(), "Gerente", Utc::now());
    tracing::warn!(
        actor_id = %supervisor.id,
        "seeded dev supervisor; use this id as the bearer token"
    );
    services.actors.register(supervisor)?;

    let app = posforge_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
