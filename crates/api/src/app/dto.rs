use std::collections::BTreeSet;

use serde::Deserialize;

use posforge_auth::{Actor, Capability, Role};
use posforge_core::Amount;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct OpenTillRequest {
    pub declared_amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct CloseSessionRequest {
    pub counted_amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct RegisterActorRequest {
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub granted: BTreeSet<Capability>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCapabilitiesRequest {
    pub granted: BTreeSet<Capability>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn actor_to_json(actor: &Actor) -> serde_json::Value {
    serde_json::json!({
        "id": actor.id.to_string(),
        "display_name": actor.display_name,
        "role": actor.role.to_string(),
        "granted": actor.granted.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        "created_at": actor.created_at.to_rfc3339(),
    })
}
