use std::sync::Arc;

use posforge_gate::{authorize, Decision, GatePolicy, Operation};
use posforge_infra::{ActorDirectory, ConfigStore, InMemorySessionStore, TillService};
use posforge_till::SessionStatus;

use crate::app::errors;
use crate::context::ActorContext;

/// Shared application services behind the router.
pub struct AppServices {
    pub till: TillService,
    pub actors: Arc<ActorDirectory>,
    pub config: Arc<ConfigStore>,
    pub policy: GatePolicy,
}

/// In-memory wiring (dev/test and single-process deployments).
pub fn build_services() -> AppServices {
    build_services_with_policy(GatePolicy::default())
}

/// Same wiring with a caller-supplied gate policy.
pub fn build_services_with_policy(policy: GatePolicy) -> AppServices {
    let store = Arc::new(InMemorySessionStore::new());
    AppServices {
        till: TillService::new(store),
        actors: Arc::new(ActorDirectory::new()),
        config: Arc::new(ConfigStore::new()),
        policy,
    }
}

impl AppServices {
    /// Run the access gate for one request; a denial becomes the 403
    /// response directly.
    pub fn gate(
        &self,
        ctx: &ActorContext,
        operation: Operation,
        status: Option<SessionStatus>,
    ) -> Result<(), axum::response::Response> {
        match authorize(ctx.capabilities(), operation, status, &self.policy) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                tracing::debug!(
                    actor_id = %ctx.actor_id(),
                    ?operation,
                    ?reason,
                    "operation denied"
                );
                Err(errors::deny_to_response(reason))
            }
        }
    }
}
