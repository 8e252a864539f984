use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use posforge_auth::{Actor, ActorSource, Capability};
use posforge_core::{ActorId, DomainError};

/// In-memory actor registry.
///
/// Stands in for the external identity system: actors are registered whole,
/// and only their capability flags can change afterwards.
#[derive(Debug, Default)]
pub struct ActorDirectory {
    inner: RwLock<HashMap<ActorId, Actor>>,
}

impl ActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> DomainError {
        DomainError::conflict("actor directory lock poisoned")
    }

    /// Register or replace an actor record.
    pub fn register(&self, actor: Actor) -> Result<(), DomainError> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;
        tracing::info!(actor_id = %actor.id, role = %actor.role, "actor registered");
        inner.insert(actor.id, actor);
        Ok(())
    }

    /// Replace an actor's capability flags. Flags never change independently
    /// of the stored record.
    pub fn update_capabilities(
        &self,
        id: ActorId,
        granted: BTreeSet<Capability>,
    ) -> Result<Actor, DomainError> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;
        let actor = inner.get_mut(&id).ok_or(DomainError::NotFound)?;
        actor.granted = granted;
        tracing::info!(actor_id = %id, "actor capabilities updated");
        Ok(actor.clone())
    }

    pub fn list(&self) -> Result<Vec<Actor>, DomainError> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        let mut actors: Vec<Actor> = inner.values().cloned().collect();
        actors.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(actors)
    }
}

impl ActorSource for ActorDirectory {
    fn get_actor(&self, id: ActorId) -> Result<Actor, DomainError> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        inner.get(&id).cloned().ok_or(DomainError::NotFound)
    }
}
