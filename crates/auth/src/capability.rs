use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named boolean permission drawn from a fixed enumeration.
///
/// Capabilities gate access to a back-office section or operation family.
/// They are owned by an [`Actor`](crate::Actor) record and only meaningful
/// for non-supervisor roles; supervisors implicitly hold all of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Sales,
    Products,
    Clients,
    Purchases,
    Suppliers,
    Batches,
    Brands,
    Reports,
    CashMovements,
}

impl Capability {
    /// Every capability, in a stable order.
    pub const ALL: [Capability; 9] = [
        Capability::Sales,
        Capability::Products,
        Capability::Clients,
        Capability::Purchases,
        Capability::Suppliers,
        Capability::Batches,
        Capability::Brands,
        Capability::Reports,
        Capability::CashMovements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Sales => "sales",
            Capability::Products => "products",
            Capability::Clients => "clients",
            Capability::Purchases => "purchases",
            Capability::Suppliers => "suppliers",
            Capability::Batches => "batches",
            Capability::Brands => "brands",
            Capability::Reports => "reports",
            Capability::CashMovements => "cash_movements",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The effective capabilities an actor holds.
///
/// Construction goes through [`resolve`](crate::resolve); enforcement code
/// should only ever ask [`CapabilitySet::has`]. The supervisor flag makes
/// the set total without materializing every variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    supervisor: bool,
    granted: BTreeSet<Capability>,
}

impl CapabilitySet {
    /// A set holding every capability (supervisor resolution).
    pub fn all() -> Self {
        Self {
            supervisor: true,
            granted: BTreeSet::new(),
        }
    }

    /// A set holding exactly the given capabilities (fail-closed default:
    /// anything absent is denied).
    pub fn of(granted: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            supervisor: false,
            granted: granted.into_iter().collect(),
        }
    }

    /// The empty set: every capability check fails.
    pub fn none() -> Self {
        Self::of([])
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.supervisor || self.granted.contains(&capability)
    }

    pub fn is_supervisor(&self) -> bool {
        self.supervisor
    }

    /// Enumerate held capabilities in stable order (for read projections).
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.has(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_denies_everything() {
        let set = CapabilitySet::none();
        for cap in Capability::ALL {
            assert!(!set.has(cap));
        }
    }

    #[test]
    fn supervisor_set_grants_everything() {
        let set = CapabilitySet::all();
        for cap in Capability::ALL {
            assert!(set.has(cap));
        }
        assert!(set.is_supervisor());
    }

    #[test]
    fn explicit_set_grants_only_listed() {
        let set = CapabilitySet::of([Capability::Sales, Capability::CashMovements]);
        assert!(set.has(Capability::Sales));
        assert!(set.has(Capability::CashMovements));
        assert!(!set.has(Capability::Reports));
        assert!(!set.is_supervisor());
    }
}
