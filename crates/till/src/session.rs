use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use posforge_core::{
    ActorId, Aggregate, AggregateRoot, Amount, DomainError, Event, MovementId, SessionId, TillId,
};

use crate::ledger;
use crate::movement::{Movement, MovementKind, Origin, PaymentMedium};
use crate::reconcile::{reconcile, Reconciliation};

/// Lifecycle status of a till session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// Aggregate root: one continuous open period of a physical cash drawer.
///
/// # Invariants
/// - Created by APERTURA, terminated by the single CIERRE; never reopened.
/// - Movements are append-only; the aggregate is the only emitter of
///   APERTURA/CIERRE movements.
/// - Terminal fields (counted amount, difference, closing actor) are set
///   exactly once.
///
/// The "at most one open session per till" invariant spans aggregates and is
/// enforced by the service layer against the store's open-session index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TillSession {
    id: SessionId,
    till: TillId,
    status: SessionStatus,
    opened_by: Option<ActorId>,
    opened_at: Option<DateTime<Utc>>,
    opening_amount: Amount,
    movements: Vec<Movement>,
    closed_by: Option<ActorId>,
    closed_at: Option<DateTime<Utc>>,
    counted_amount: Option<Amount>,
    difference: Option<Amount>,
    version: u64,
    created: bool,
}

impl TillSession {
    /// Create an empty, not-yet-opened instance for rehydration.
    pub fn empty(id: SessionId) -> Self {
        Self {
            id,
            till: TillId::new(0),
            status: SessionStatus::Closed,
            opened_by: None,
            opened_at: None,
            opening_amount: Amount::ZERO,
            movements: Vec::new(),
            closed_by: None,
            closed_at: None,
            counted_amount: None,
            difference: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> SessionId {
        self.id
    }

    pub fn till(&self) -> TillId {
        self.till
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, SessionStatus::Open)
    }

    pub fn exists(&self) -> bool {
        self.created
    }

    pub fn opened_by(&self) -> Option<ActorId> {
        self.opened_by
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    pub fn opening_amount(&self) -> Amount {
        self.opening_amount
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn closed_by(&self) -> Option<ActorId> {
        self.closed_by
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn counted_amount(&self) -> Option<Amount> {
        self.counted_amount
    }

    pub fn difference(&self) -> Option<Amount> {
        self.difference
    }

    /// Current expected balance: signed single-pass sum over the ledger.
    pub fn balance(&self) -> Amount {
        ledger::balance(&self.movements)
    }
}

impl AggregateRoot for TillSession {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command: open a till session with a declared float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSession {
    pub session_id: SessionId,
    pub till: TillId,
    pub actor_id: ActorId,
    pub actor_name: String,
    pub declared_amount: Amount,
    pub movement_id: MovementId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: append a financial movement to the open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMovement {
    pub session_id: SessionId,
    pub movement_id: MovementId,
    pub kind: MovementKind,
    /// Ignored for REVERSO when zero; otherwise must match the derived
    /// inverse amount.
    pub amount: Amount,
    pub medium: Option<PaymentMedium>,
    pub description: String,
    pub origin: Origin,
    pub actor_id: ActorId,
    pub actor_name: String,
    pub reverses: Option<MovementId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: close the session against a physically counted amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseSession {
    pub session_id: SessionId,
    pub actor_id: ActorId,
    pub actor_name: String,
    pub counted_amount: Amount,
    pub movement_id: MovementId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCommand {
    Open(OpenSession),
    Record(RecordMovement),
    Close(CloseSession),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Event: session opened; carries the APERTURA movement data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOpened {
    pub session_id: SessionId,
    pub till: TillId,
    pub actor_id: ActorId,
    pub actor_name: String,
    pub declared_amount: Amount,
    pub movement_id: MovementId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a movement was appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecorded {
    pub movement: Movement,
}

/// Event: session closed; carries the reconciliation and the CIERRE movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClosed {
    pub session_id: SessionId,
    pub actor_id: ActorId,
    pub actor_name: String,
    pub reconciliation: Reconciliation,
    pub movement_id: MovementId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Opened(SessionOpened),
    MovementRecorded(MovementRecorded),
    Closed(SessionClosed),
}

impl SessionOpened {
    /// The APERTURA movement this event appends.
    pub fn movement(&self) -> Movement {
        Movement {
            id: self.movement_id,
            session_id: self.session_id,
            kind: MovementKind::Apertura,
            amount: self.declared_amount,
            medium: None,
            description: "apertura de caja".to_string(),
            origin: Origin::Apertura,
            actor_id: self.actor_id,
            actor_name: self.actor_name.clone(),
            occurred_at: self.occurred_at,
            reverses: None,
            difference: None,
        }
    }
}

impl SessionClosed {
    /// The CIERRE summary movement this event appends.
    pub fn movement(&self) -> Movement {
        Movement {
            id: self.movement_id,
            session_id: self.session_id,
            kind: MovementKind::Cierre,
            amount: self.reconciliation.counted,
            medium: None,
            description: "cierre de caja".to_string(),
            origin: Origin::Cierre,
            actor_id: self.actor_id,
            actor_name: self.actor_name.clone(),
            occurred_at: self.occurred_at,
            reverses: None,
            difference: Some(self.reconciliation.difference),
        }
    }
}

impl SessionEvent {
    /// The ledger movement this event appends. Every session event appends
    /// exactly one: APERTURA for open, the recorded movement itself, CIERRE
    /// for close.
    pub fn movement(&self) -> Movement {
        match self {
            SessionEvent::Opened(e) => e.movement(),
            SessionEvent::MovementRecorded(e) => e.movement.clone(),
            SessionEvent::Closed(e) => e.movement(),
        }
    }
}

impl Event for SessionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::Opened(_) => "till.session.opened",
            SessionEvent::MovementRecorded(_) => "till.session.movement_recorded",
            SessionEvent::Closed(_) => "till.session.closed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::Opened(e) => e.occurred_at,
            SessionEvent::MovementRecorded(e) => e.movement.occurred_at,
            SessionEvent::Closed(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for TillSession {
    type Command = SessionCommand;
    type Event = SessionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SessionEvent::Opened(e) => self.apply_opened(e),
            SessionEvent::MovementRecorded(e) => self.movements.push(e.movement.clone()),
            SessionEvent::Closed(e) => self.apply_closed(e),
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SessionCommand::Open(cmd) => self.handle_open(cmd),
            SessionCommand::Record(cmd) => self.handle_record(cmd),
            SessionCommand::Close(cmd) => self.handle_close(cmd),
        }
    }
}

impl TillSession {
    fn ensure_session_id(&self, session_id: SessionId) -> Result<(), DomainError> {
        if self.id != session_id {
            return Err(DomainError::conflict("session_id mismatch"));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenSession) -> Result<Vec<SessionEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("session already exists"));
        }
        if cmd.declared_amount.is_negative() {
            return Err(DomainError::validation(
                "declared opening amount must be non-negative",
            ));
        }

        Ok(vec![SessionEvent::Opened(SessionOpened {
            session_id: cmd.session_id,
            till: cmd.till,
            actor_id: cmd.actor_id,
            actor_name: cmd.actor_name.clone(),
            declared_amount: cmd.declared_amount,
            movement_id: cmd.movement_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record(&self, cmd: &RecordMovement) -> Result<Vec<SessionEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_session_id(cmd.session_id)?;

        if !self.is_open() {
            return Err(DomainError::invalid_state("session is closed"));
        }
        if cmd.kind.is_session_boundary() {
            return Err(DomainError::validation(
                "APERTURA/CIERRE movements are emitted by the session lifecycle",
            ));
        }

        let (amount, medium, reverses) = match cmd.kind {
            MovementKind::Ingreso | MovementKind::Egreso => {
                if cmd.amount.minor() <= 0 {
                    return Err(DomainError::validation(format!(
                        "{} amount must be positive",
                        cmd.kind
                    )));
                }
                let Some(medium) = cmd.medium else {
                    return Err(DomainError::validation(format!(
                        "{} requires a payment medium",
                        cmd.kind
                    )));
                };
                (cmd.amount, Some(medium), None)
            }
            MovementKind::Ajuste => {
                if cmd.amount.is_zero() {
                    return Err(DomainError::validation("AJUSTE amount must be non-zero"));
                }
                (cmd.amount, None, None)
            }
            MovementKind::Reverso => self.validate_reverso(cmd)?,
            MovementKind::Apertura | MovementKind::Cierre => unreachable!(),
        };

        let movement = Movement {
            id: cmd.movement_id,
            session_id: cmd.session_id,
            kind: cmd.kind,
            amount,
            medium,
            description: cmd.description.clone(),
            origin: cmd.origin,
            actor_id: cmd.actor_id,
            actor_name: cmd.actor_name.clone(),
            occurred_at: cmd.occurred_at,
            reverses,
            difference: None,
        };

        Ok(vec![SessionEvent::MovementRecorded(MovementRecorded {
            movement,
        })])
    }

    /// Reversal policy: the target must belong to this session, must be an
    /// INGRESO/EGRESO/AJUSTE, and can be reversed at most once. The reversal
    /// amount is derived as the inverse signed effect of the target; a
    /// non-zero caller amount that disagrees is rejected.
    fn validate_reverso(
        &self,
        cmd: &RecordMovement,
    ) -> Result<(Amount, Option<PaymentMedium>, Option<MovementId>), DomainError> {
        let Some(target_id) = cmd.reverses else {
            return Err(DomainError::validation(
                "REVERSO requires a reversed movement reference",
            ));
        };

        let Some(target) = self.movements.iter().find(|m| m.id == target_id) else {
            return Err(DomainError::validation(
                "REVERSO references a movement outside this session",
            ));
        };

        if target.kind.is_session_boundary() {
            return Err(DomainError::validation(
                "APERTURA/CIERRE movements cannot be reversed",
            ));
        }
        if target.kind == MovementKind::Reverso {
            return Err(DomainError::validation("a reversal cannot be reversed"));
        }
        if self
            .movements
            .iter()
            .any(|m| m.kind == MovementKind::Reverso && m.reverses == Some(target_id))
        {
            return Err(DomainError::validation("movement already reversed"));
        }

        let derived = Amount::from_minor(-target.signed_effect());
        if !cmd.amount.is_zero() && cmd.amount != derived {
            return Err(DomainError::validation(
                "REVERSO amount must be the inverse of the reversed movement",
            ));
        }

        Ok((derived, target.medium, Some(target_id)))
    }

    fn handle_close(&self, cmd: &CloseSession) -> Result<Vec<SessionEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_session_id(cmd.session_id)?;

        if !self.is_open() {
            return Err(DomainError::invalid_state("session is already closed"));
        }
        if cmd.counted_amount.is_negative() {
            return Err(DomainError::validation(
                "counted amount must be non-negative",
            ));
        }

        let reconciliation = reconcile(self.balance(), cmd.counted_amount);

        Ok(vec![SessionEvent::Closed(SessionClosed {
            session_id: cmd.session_id,
            actor_id: cmd.actor_id,
            actor_name: cmd.actor_name.clone(),
            reconciliation,
            movement_id: cmd.movement_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event appliers
    // ─────────────────────────────────────────────────────────────────────────

    fn apply_opened(&mut self, e: &SessionOpened) {
        self.id = e.session_id;
        self.till = e.till;
        self.status = SessionStatus::Open;
        self.opened_by = Some(e.actor_id);
        self.opened_at = Some(e.occurred_at);
        self.opening_amount = e.declared_amount;
        self.created = true;
        self.movements.push(e.movement());
    }

    fn apply_closed(&mut self, e: &SessionClosed) {
        self.status = SessionStatus::Closed;
        self.closed_by = Some(e.actor_id);
        self.closed_at = Some(e.occurred_at);
        self.counted_amount = Some(e.reconciliation.counted);
        self.difference = Some(e.reconciliation.difference);
        self.movements.push(e.movement());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn open_session(declared_minor: i64) -> TillSession {
        let session_id = SessionId::new();
        let mut session = TillSession::empty(session_id);
        let cmd = OpenSession {
            session_id,
            till: TillId::new(1),
            actor_id: ActorId::new(),
            actor_name: "Cajero Uno".to_string(),
            declared_amount: Amount::from_minor(declared_minor),
            movement_id: MovementId::new(),
            occurred_at: test_time(),
        };
        let events = session.handle(&SessionCommand::Open(cmd)).unwrap();
        for e in &events {
            session.apply(e);
        }
        session
    }

    fn record_cmd(session: &TillSession, kind: MovementKind, minor: i64) -> RecordMovement {
        RecordMovement {
            session_id: session.id_typed(),
            movement_id: MovementId::new(),
            kind,
            amount: Amount::from_minor(minor),
            medium: kind.requires_medium().then_some(PaymentMedium::Cash),
            description: "test".to_string(),
            origin: Origin::Manual,
            actor_id: ActorId::new(),
            actor_name: "Cajero Uno".to_string(),
            reverses: None,
            occurred_at: test_time(),
        }
    }

    fn record(session: &mut TillSession, kind: MovementKind, minor: i64) -> MovementId {
        let cmd = record_cmd(session, kind, minor);
        let id = cmd.movement_id;
        let events = session.handle(&SessionCommand::Record(cmd)).unwrap();
        for e in &events {
            session.apply(e);
        }
        id
    }

    fn close(session: &mut TillSession, counted_minor: i64) -> Reconciliation {
        let cmd = CloseSession {
            session_id: session.id_typed(),
            actor_id: ActorId::new(),
            actor_name: "Gerente".to_string(),
            counted_amount: Amount::from_minor(counted_minor),
            movement_id: MovementId::new(),
            occurred_at: test_time(),
        };
        let events = session.handle(&SessionCommand::Close(cmd)).unwrap();
        let SessionEvent::Closed(closed) = &events[0] else {
            panic!("expected SessionClosed event");
        };
        let reconciliation = closed.reconciliation;
        for e in &events {
            session.apply(e);
        }
        reconciliation
    }

    #[test]
    fn open_emits_apertura_and_sets_opening_balance() {
        let session = open_session(100_000);
        assert!(session.is_open());
        assert_eq!(session.movements().len(), 1);
        assert_eq!(session.movements()[0].kind, MovementKind::Apertura);
        assert_eq!(session.balance(), Amount::from_minor(100_000));
    }

    #[test]
    fn open_twice_is_a_conflict() {
        let session = open_session(1_000);
        let cmd = OpenSession {
            session_id: session.id_typed(),
            till: TillId::new(1),
            actor_id: ActorId::new(),
            actor_name: "Otro".to_string(),
            declared_amount: Amount::from_minor(500),
            movement_id: MovementId::new(),
            occurred_at: test_time(),
        };
        let err = session.handle(&SessionCommand::Open(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn negative_declared_amount_is_rejected() {
        let session_id = SessionId::new();
        let session = TillSession::empty(session_id);
        let cmd = OpenSession {
            session_id,
            till: TillId::new(1),
            actor_id: ActorId::new(),
            actor_name: "Cajero".to_string(),
            declared_amount: Amount::from_minor(-1),
            movement_id: MovementId::new(),
            occurred_at: test_time(),
        };
        let err = session.handle(&SessionCommand::Open(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn reconciliation_example_from_the_field() {
        // Opening 1000.00, INGRESO 500.00 cash, EGRESO 200.00 cash,
        // counted 1290.00 -> expected 1300.00, difference -10.00.
        let mut session = open_session(100_000);
        record(&mut session, MovementKind::Ingreso, 50_000);
        record(&mut session, MovementKind::Egreso, 20_000);
        assert_eq!(session.balance(), Amount::from_minor(130_000));

        let r = close(&mut session, 129_000);
        assert_eq!(r.expected, Amount::from_minor(130_000));
        assert_eq!(r.difference, Amount::from_minor(-1_000));
        assert_eq!(session.counted_amount(), Some(Amount::from_minor(129_000)));
        assert_eq!(session.difference(), Some(Amount::from_minor(-1_000)));
    }

    #[test]
    fn cierre_does_not_change_the_arithmetic_balance() {
        let mut session = open_session(10_000);
        record(&mut session, MovementKind::Ingreso, 5_000);
        let before = session.balance();
        close(&mut session, 15_000);
        assert_eq!(session.balance(), before);
    }

    #[test]
    fn close_twice_fails_with_invalid_state() {
        let mut session = open_session(10_000);
        close(&mut session, 10_000);

        let cmd = CloseSession {
            session_id: session.id_typed(),
            actor_id: ActorId::new(),
            actor_name: "Gerente".to_string(),
            counted_amount: Amount::from_minor(9_000),
            movement_id: MovementId::new(),
            occurred_at: test_time(),
        };
        let err = session.handle(&SessionCommand::Close(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        // Terminal fields were set exactly once.
        assert_eq!(session.counted_amount(), Some(Amount::from_minor(10_000)));
        assert_eq!(session.difference(), Some(Amount::ZERO));
    }

    #[test]
    fn movement_against_closed_session_fails_with_invalid_state() {
        let mut session = open_session(10_000);
        close(&mut session, 10_000);

        let cmd = record_cmd(&session, MovementKind::Egreso, 500);
        let err = session.handle(&SessionCommand::Record(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn negative_ingreso_is_rejected() {
        let session = open_session(10_000);
        let cmd = record_cmd(&session, MovementKind::Ingreso, -500);
        let err = session.handle(&SessionCommand::Record(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn ingreso_without_medium_is_rejected() {
        let session = open_session(10_000);
        let mut cmd = record_cmd(&session, MovementKind::Ingreso, 500);
        cmd.medium = None;
        let err = session.handle(&SessionCommand::Record(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn zero_ajuste_is_rejected_but_signed_ajuste_counts() {
        let mut session = open_session(10_000);

        let cmd = record_cmd(&session, MovementKind::Ajuste, 0);
        let err = session.handle(&SessionCommand::Record(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        record(&mut session, MovementKind::Ajuste, -1_500);
        assert_eq!(session.balance(), Amount::from_minor(8_500));
    }

    #[test]
    fn direct_apertura_or_cierre_append_is_rejected() {
        let session = open_session(10_000);
        for kind in [MovementKind::Apertura, MovementKind::Cierre] {
            let mut cmd = record_cmd(&session, kind, 100);
            cmd.medium = None;
            let err = session.handle(&SessionCommand::Record(cmd)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn reverso_derives_the_inverse_amount() {
        let mut session = open_session(10_000);
        let ingreso = record(&mut session, MovementKind::Ingreso, 5_000);
        assert_eq!(session.balance(), Amount::from_minor(15_000));

        let mut cmd = record_cmd(&session, MovementKind::Reverso, 0);
        cmd.medium = None;
        cmd.reverses = Some(ingreso);
        let events = session.handle(&SessionCommand::Record(cmd)).unwrap();
        let SessionEvent::MovementRecorded(e) = &events[0] else {
            panic!("expected MovementRecorded");
        };
        assert_eq!(e.movement.amount, Amount::from_minor(-5_000));
        assert_eq!(e.movement.medium, Some(PaymentMedium::Cash));
        for e in &events {
            session.apply(e);
        }
        assert_eq!(session.balance(), Amount::from_minor(10_000));
    }

    #[test]
    fn reverso_of_egreso_adds_the_amount_back() {
        let mut session = open_session(10_000);
        let egreso = record(&mut session, MovementKind::Egreso, 2_000);
        assert_eq!(session.balance(), Amount::from_minor(8_000));

        let mut cmd = record_cmd(&session, MovementKind::Reverso, 0);
        cmd.medium = None;
        cmd.reverses = Some(egreso);
        let events = session.handle(&SessionCommand::Record(cmd)).unwrap();
        for e in &events {
            session.apply(e);
        }
        assert_eq!(session.balance(), Amount::from_minor(10_000));
    }

    #[test]
    fn reverso_of_unknown_movement_is_invalid_input() {
        let session = open_session(10_000);
        let mut cmd = record_cmd(&session, MovementKind::Reverso, 0);
        cmd.medium = None;
        cmd.reverses = Some(MovementId::new()); // belongs to no session, let alone this one
        let err = session.handle(&SessionCommand::Record(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn reverso_cannot_target_apertura_or_a_reverso_or_reverse_twice() {
        let mut session = open_session(10_000);
        let apertura_id = session.movements()[0].id;
        let ingreso = record(&mut session, MovementKind::Ingreso, 1_000);

        let mut cmd = record_cmd(&session, MovementKind::Reverso, 0);
        cmd.medium = None;
        cmd.reverses = Some(apertura_id);
        assert!(session.handle(&SessionCommand::Record(cmd)).is_err());

        // First reversal succeeds.
        let mut cmd = record_cmd(&session, MovementKind::Reverso, 0);
        cmd.medium = None;
        cmd.reverses = Some(ingreso);
        let reverso_id = cmd.movement_id;
        let events = session.handle(&SessionCommand::Record(cmd)).unwrap();
        for e in &events {
            session.apply(e);
        }

        // Reversing the same target again is rejected.
        let mut cmd = record_cmd(&session, MovementKind::Reverso, 0);
        cmd.medium = None;
        cmd.reverses = Some(ingreso);
        assert!(session.handle(&SessionCommand::Record(cmd)).is_err());

        // Reversing the reversal is rejected.
        let mut cmd = record_cmd(&session, MovementKind::Reverso, 0);
        cmd.medium = None;
        cmd.reverses = Some(reverso_id);
        assert!(session.handle(&SessionCommand::Record(cmd)).is_err());
    }

    #[test]
    fn reverso_with_mismatched_explicit_amount_is_rejected() {
        let mut session = open_session(10_000);
        let ingreso = record(&mut session, MovementKind::Ingreso, 5_000);

        let mut cmd = record_cmd(&session, MovementKind::Reverso, -4_999);
        cmd.medium = None;
        cmd.reverses = Some(ingreso);
        let err = session.handle(&SessionCommand::Record(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let session = open_session(10_000);
        let cmd = record_cmd(&session, MovementKind::Ingreso, 500);

        let events1 = session
            .handle(&SessionCommand::Record(cmd.clone()))
            .unwrap();
        let events2 = session.handle(&SessionCommand::Record(cmd)).unwrap();

        assert_eq!(events1, events2);
        assert_eq!(session.movements().len(), 1);
        assert_eq!(session.version(), 1);
    }

    #[test]
    fn version_increments_per_applied_event() {
        let mut session = open_session(10_000);
        assert_eq!(session.version(), 1);
        record(&mut session, MovementKind::Ingreso, 500);
        assert_eq!(session.version(), 2);
        close(&mut session, 10_500);
        assert_eq!(session.version(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of valid INGRESO/EGRESO/AJUSTE
        /// movements, the balance equals opening plus the signed sum, and is
        /// stable under repeated reads.
        #[test]
        fn balance_equals_signed_sum(
            opening in 0i64..10_000_000,
            moves in prop::collection::vec((0u8..3, 1i64..1_000_000), 0..25)
        ) {
            let mut session = open_session(opening);
            let mut expected: i128 = opening as i128;

            for (kind_idx, amount) in moves {
                match kind_idx {
                    0 => {
                        record(&mut session, MovementKind::Ingreso, amount);
                        expected += amount as i128;
                    }
                    1 => {
                        record(&mut session, MovementKind::Egreso, amount);
                        expected -= amount as i128;
                    }
                    _ => {
                        // Alternate adjustment sign off the amount's parity.
                        let signed = if amount % 2 == 0 { amount } else { -amount };
                        record(&mut session, MovementKind::Ajuste, signed);
                        expected += signed as i128;
                    }
                }
            }

            prop_assert_eq!(session.balance().minor() as i128, expected);
            prop_assert_eq!(session.balance(), session.balance());
        }
    }
}
