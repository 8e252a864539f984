use posforge_auth::{Actor, CapabilitySet};
use posforge_core::ActorId;

/// Authenticated actor context for a request.
///
/// Built once by the auth middleware; capabilities are resolved at that
/// point and stay fixed for the lifetime of the request.
#[derive(Debug, Clone)]
pub struct ActorContext {
    actor: Actor,
    capabilities: CapabilitySet,
}

impl ActorContext {
    pub fn new(actor: Actor, capabilities: CapabilitySet) -> Self {
        Self {
            actor,
            capabilities,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor.id
    }

    pub fn display_name(&self) -> &str {
        &self.actor.display_name
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}
