use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use posforge_core::{ActorId, Amount, MovementId, SessionId};

/// Type of a ledger movement. The amount's arithmetic effect on the till is
/// implied by the type (see [`Movement::signed_effect`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    /// Inflow of funds. Stored non-negative, adds to the till.
    Ingreso,
    /// Outflow of funds. Stored non-negative, subtracts from the till.
    Egreso,
    /// Manual adjustment. Stored signed, non-zero.
    Ajuste,
    /// Reversal of a prior movement. Stored with the inverse signed effect
    /// of the referenced movement.
    Reverso,
    /// Opening record carrying the declared float. Emitted only by the
    /// session lifecycle.
    Apertura,
    /// Closing summary record. Emitted only by the session lifecycle and
    /// excluded from the arithmetic balance.
    Cierre,
}

impl MovementKind {
    /// APERTURA/CIERRE are session-lifecycle records, never appended directly.
    pub fn is_session_boundary(&self) -> bool {
        matches!(self, MovementKind::Apertura | MovementKind::Cierre)
    }

    /// Payment medium is meaningful only for money actually moving in or out.
    pub fn requires_medium(&self) -> bool {
        matches!(self, MovementKind::Ingreso | MovementKind::Egreso)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Ingreso => "INGRESO",
            MovementKind::Egreso => "EGRESO",
            MovementKind::Ajuste => "AJUSTE",
            MovementKind::Reverso => "REVERSO",
            MovementKind::Apertura => "APERTURA",
            MovementKind::Cierre => "CIERRE",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment medium tag for INGRESO/EGRESO movements.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMedium {
    Cash,
    Card,
    Transfer,
    Credit,
}

impl PaymentMedium {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMedium::Cash => "cash",
            PaymentMedium::Card => "card",
            PaymentMedium::Transfer => "transfer",
            PaymentMedium::Credit => "credit",
        }
    }
}

impl core::fmt::Display for PaymentMedium {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business origin of a movement, drawn from the closed set the back office
/// records against the till.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    Venta,
    Compra,
    Devolucion,
    Apertura,
    Cierre,
    Manual,
    AjusteManual,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Venta => "VENTA",
            Origin::Compra => "COMPRA",
            Origin::Devolucion => "DEVOLUCION",
            Origin::Apertura => "APERTURA",
            Origin::Cierre => "CIERRE",
            Origin::Manual => "MANUAL",
            Origin::AjusteManual => "AJUSTE_MANUAL",
        }
    }
}

impl core::fmt::Display for Origin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable, ordered ledger entry.
///
/// Movements are append-only: once written they are never edited or deleted.
/// Corrections are new REVERSO movements referencing the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub session_id: SessionId,
    pub kind: MovementKind,
    /// Amount in minor units; sign convention depends on `kind`.
    pub amount: Amount,
    /// Set only for INGRESO/EGRESO (and inherited by their REVERSO).
    pub medium: Option<PaymentMedium>,
    pub description: String,
    pub origin: Origin,
    pub actor_id: ActorId,
    pub actor_name: String,
    pub occurred_at: DateTime<Utc>,
    /// For REVERSO: the movement being reversed.
    pub reverses: Option<MovementId>,
    /// For CIERRE: counted minus expected.
    pub difference: Option<Amount>,
}

impl Movement {
    /// Signed contribution of this movement to the till balance, in minor
    /// units.
    ///
    /// INGRESO and APERTURA add, EGRESO subtracts, AJUSTE and REVERSO carry
    /// their stored sign, CIERRE is a summary record contributing zero.
    pub fn signed_effect(&self) -> i64 {
        match self.kind {
            MovementKind::Ingreso | MovementKind::Apertura => self.amount.minor(),
            MovementKind::Egreso => -self.amount.minor(),
            MovementKind::Ajuste | MovementKind::Reverso => self.amount.minor(),
            MovementKind::Cierre => 0,
        }
    }
}
