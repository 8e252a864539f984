use serde::{Deserialize, Serialize};

use posforge_auth::Capability;

/// Everything an actor can ask the back office to do, engine operations and
/// peripheral screens alike.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    // Till engine
    OpenTill,
    CloseTill,
    RecordMovement,
    ViewMovements,
    ViewHistory,
    ViewBalance,
    ViewSession,
    // Peripheral screens (simple data entry behind the same gate)
    ManageSales,
    ManageProducts,
    ManageClients,
    ManagePurchases,
    ManageSuppliers,
    ManageBatches,
    ManageBrands,
    ViewReports,
}

impl Operation {
    /// The capability a non-supervisor actor must hold for this operation.
    pub fn required_capability(&self) -> Capability {
        match self {
            Operation::OpenTill
            | Operation::CloseTill
            | Operation::RecordMovement
            | Operation::ViewMovements
            | Operation::ViewHistory
            | Operation::ViewBalance
            | Operation::ViewSession => Capability::CashMovements,
            Operation::ManageSales => Capability::Sales,
            Operation::ManageProducts => Capability::Products,
            Operation::ManageClients => Capability::Clients,
            Operation::ManagePurchases => Capability::Purchases,
            Operation::ManageSuppliers => Capability::Suppliers,
            Operation::ManageBatches => Capability::Batches,
            Operation::ManageBrands => Capability::Brands,
            Operation::ViewReports => Capability::Reports,
        }
    }

    /// Whether the operation acts on the till and therefore normally needs an
    /// open session. Peripheral screens don't care about the drawer at all.
    pub fn touches_till(&self) -> bool {
        matches!(
            self,
            Operation::OpenTill
                | Operation::CloseTill
                | Operation::RecordMovement
                | Operation::ViewMovements
                | Operation::ViewHistory
                | Operation::ViewBalance
                | Operation::ViewSession
        )
    }
}
