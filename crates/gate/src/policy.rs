use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::operation::Operation;

/// Gate configuration: which till operations stay available while the till
/// is closed.
///
/// This is data, not code, so deployments can widen or narrow the set
/// without touching the evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatePolicy {
    allowed_while_closed: BTreeSet<Operation>,
}

impl GatePolicy {
    pub fn new(allowed_while_closed: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            allowed_while_closed: allowed_while_closed.into_iter().collect(),
        }
    }

    pub fn is_allowed_while_closed(&self, operation: Operation) -> bool {
        self.allowed_while_closed.contains(&operation)
    }
}

impl Default for GatePolicy {
    /// Mirrors the cashier screens reachable with the drawer closed:
    /// history, the movements view, the caja screen itself, and opening a
    /// new session.
    fn default() -> Self {
        Self::new([
            Operation::ViewHistory,
            Operation::ViewMovements,
            Operation::ViewSession,
            Operation::OpenTill,
        ])
    }
}
