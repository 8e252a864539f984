use posforge_core::{ActorId, DomainError};

use crate::{Actor, CapabilitySet};

/// Resolve an actor's effective capability set.
///
/// - No IO
/// - No panics
/// - Supervisors get every capability regardless of stored flags.
/// - Everyone else mirrors their stored flags, fail-closed: an unset or
///   unknown flag is simply absent from the set.
pub fn resolve(actor: &Actor) -> CapabilitySet {
    if actor.role.is_supervisor() {
        CapabilitySet::all()
    } else {
        CapabilitySet::of(actor.granted.iter().copied())
    }
}

/// Identity collaborator: loads actor records by id.
///
/// Implementations live in infra (directory-backed, external identity
/// service, ...). A missing record must surface as `DomainError::NotFound`;
/// callers then treat the actor as holding zero capabilities — resolution is
/// never partial.
pub trait ActorSource: Send + Sync {
    fn get_actor(&self, id: ActorId) -> Result<Actor, DomainError>;
}
