use serde::{Deserialize, Serialize};

use posforge_auth::{Capability, CapabilitySet};
use posforge_till::SessionStatus;

use crate::operation::Operation;
use crate::policy::GatePolicy;

/// Why an operation was denied. These are expected outcomes carried as
/// values; the presentation layer maps them to user-facing messages.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "capability")]
pub enum DenyReason {
    MissingCapability(Capability),
    SessionClosed,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Admit or reject an operation.
///
/// Evaluation order:
/// 1. supervisors are always allowed;
/// 2. a missing required capability denies with `MissingCapability`;
/// 3. a till operation against a closed till denies with `SessionClosed`,
///    unless the policy allows it while closed;
/// 4. otherwise allow.
///
/// `session_status` is `None` when the call has no drawer in scope (the
/// cross-till history listing, for instance); step 3 only applies when a
/// concrete status is passed.
///
/// Stateless and read-only: callers pass the current projections, the gate
/// never mutates capability, session or ledger state.
pub fn authorize(
    capabilities: &CapabilitySet,
    operation: Operation,
    session_status: Option<SessionStatus>,
    policy: &GatePolicy,
) -> Decision {
    if capabilities.is_supervisor() {
        return Decision::Allow;
    }

    let required = operation.required_capability();
    if !capabilities.has(required) {
        return Decision::Deny(DenyReason::MissingCapability(required));
    }

    if operation.touches_till()
        && session_status == Some(SessionStatus::Closed)
        && !policy.is_allowed_while_closed(operation)
    {
        return Decision::Deny(DenyReason::SessionClosed);
    }

    Decision::Allow
}
