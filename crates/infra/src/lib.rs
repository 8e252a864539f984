//! `posforge-infra` — stores and the service facade.
//!
//! Everything here is infrastructure around the pure `posforge-till` domain:
//! the durable session store seam (in-memory implementation for now), the
//! per-till serialization of mutations, the actor directory, and the
//! configuration store the peripheral screens consume.

pub mod actors;
pub mod config;
pub mod service;
pub mod store;

pub use actors::ActorDirectory;
pub use config::{ConfigDomain, ConfigStore};
pub use service::{ClosureSummary, NewMovement, SessionView, TillService, TillStatus};
pub use store::{InMemorySessionStore, SessionStore};
