//! `posforge-till` — the cash-drawer session engine.
//!
//! One till ("caja") lives through a sequence of sessions: APERTURA opens a
//! session with a declared float, every financial event is appended as an
//! immutable movement, and CIERRE reconciles the counted cash against the
//! ledger balance. The [`TillSession`] aggregate is the only component that
//! emits APERTURA/CIERRE movements.

pub mod ledger;
pub mod movement;
pub mod reconcile;
pub mod session;

pub use ledger::{balance, filtered, query, HistoryFilter, HistoryPage, DEFAULT_PAGE_SIZE};
pub use movement::{Movement, MovementKind, Origin, PaymentMedium};
pub use reconcile::{reconcile, Reconciliation};
pub use session::{
    CloseSession, MovementRecorded, OpenSession, RecordMovement, SessionClosed, SessionCommand,
    SessionEvent, SessionOpened, SessionStatus, TillSession,
};
