use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use posforge_core::ActorId;

use crate::Capability;

/// Role of an actor, drawn from a closed set.
///
/// `Supervisor` ("gerente") implicitly holds every capability; stored flags
/// only matter for `Employee` ("empleado") actors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Supervisor,
    Employee,
}

impl Role {
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Role::Supervisor)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Supervisor => f.write_str("supervisor"),
            Role::Employee => f.write_str("employee"),
        }
    }
}

/// Identity of a person operating the system.
///
/// Created by an external identity system and immutable during a till
/// session. Capability flags are mutated only by a supervisor-level
/// administrative action, never independently of the actor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub display_name: String,
    pub role: Role,
    /// Stored capability flags. Only meaningful when `role` is `Employee`.
    pub granted: BTreeSet<Capability>,
    pub created_at: DateTime<Utc>,
}

impl Actor {
    pub fn supervisor(id: ActorId, display_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role: Role::Supervisor,
            granted: BTreeSet::new(),
            created_at,
        }
    }

    pub fn employee(
        id: ActorId,
        display_name: impl Into<String>,
        granted: impl IntoIterator<Item = Capability>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role: Role::Employee,
            granted: granted.into_iter().collect(),
            created_at,
        }
    }
}
