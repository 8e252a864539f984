//! `posforge-auth` — actor identity and capability resolution.
//!
//! This crate is intentionally decoupled from HTTP and storage: it defines
//! who an actor is, which capabilities exist, and how an actor's effective
//! capability set is resolved. Enforcement happens in `posforge-gate`.

pub mod actor;
pub mod capability;
pub mod resolver;

pub use actor::{Actor, Role};
pub use capability::{Capability, CapabilitySet};
pub use resolver::{resolve, ActorSource};
