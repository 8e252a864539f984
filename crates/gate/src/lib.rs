//! `posforge-gate` — the access gate.
//!
//! Composes the resolved capability set with the till's session state to
//! admit or reject an operation before it reaches the ledger or the
//! reconciliation path. Denials are typed decisions, never errors: the
//! caller's presentation layer turns the reason code into a message.

pub mod decide;
pub mod operation;
pub mod policy;

pub use decide::{authorize, Decision, DenyReason};
pub use operation::Operation;
pub use policy::GatePolicy;
