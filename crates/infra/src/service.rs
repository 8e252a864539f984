use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use posforge_core::{
    ActorId, Aggregate, AggregateRoot, Amount, DomainError, ExpectedVersion, MovementId, SessionId,
    TillId,
};
use posforge_till::{
    query, CloseSession, HistoryFilter, HistoryPage, Movement, MovementKind, OpenSession, Origin,
    PaymentMedium, Reconciliation, RecordMovement, SessionCommand, SessionStatus, TillSession,
};
use serde::{Deserialize, Serialize};

use crate::store::SessionStore;

/// How long a mutation waits for its till's turn before giving up with
/// [`DomainError::Busy`].
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(2);

/// Caller-supplied data for a new ledger movement.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMovement {
    pub kind: MovementKind,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub medium: Option<PaymentMedium>,
    pub description: String,
    pub origin: Origin,
    #[serde(default)]
    pub reverses: Option<MovementId>,
}

/// Read model of a session, returned by queries.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub till: TillId,
    pub status: SessionStatus,
    pub opened_by: Option<ActorId>,
    pub opened_at: Option<DateTime<Utc>>,
    pub opening_amount: Amount,
    pub balance: Amount,
    pub movement_count: usize,
    pub closed_by: Option<ActorId>,
    pub closed_at: Option<DateTime<Utc>>,
    pub counted_amount: Option<Amount>,
    pub difference: Option<Amount>,
}

impl SessionView {
    fn of(session: &TillSession) -> Self {
        Self {
            session_id: session.id_typed(),
            till: session.till(),
            status: session.status(),
            opened_by: session.opened_by(),
            opened_at: session.opened_at(),
            opening_amount: session.opening_amount(),
            balance: session.balance(),
            movement_count: session.movements().len(),
            closed_by: session.closed_by(),
            closed_at: session.closed_at(),
            counted_amount: session.counted_amount(),
            difference: session.difference(),
        }
    }
}

/// Result of closing a session: the reconciliation plus the final view.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureSummary {
    pub reconciliation: Reconciliation,
    pub session: SessionView,
}

/// Whether a till currently has an open session.
#[derive(Debug, Clone, Serialize)]
pub struct TillStatus {
    pub till: TillId,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

/// Application service for till sessions.
///
/// Mutations serialize per till through an async mutex so two cashiers
/// hammering the same drawer cannot interleave; different tills proceed in
/// parallel. A mutation that cannot take its till's turn within `lock_wait`
/// fails with [`DomainError::Busy`] instead of queueing forever. Reads skip
/// the till lock entirely and work off store snapshots.
pub struct TillService {
    store: Arc<dyn SessionStore>,
    locks: Mutex<HashMap<TillId, Arc<tokio::sync::Mutex<()>>>>,
    lock_wait: Duration,
}

impl TillService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_lock_wait(store, DEFAULT_LOCK_WAIT)
    }

    pub fn with_lock_wait(store: Arc<dyn SessionStore>, lock_wait: Duration) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            lock_wait,
        }
    }

    fn till_lock(&self, till: TillId) -> Result<Arc<tokio::sync::Mutex<()>>, DomainError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| DomainError::conflict("till lock table poisoned"))?;
        Ok(locks.entry(till).or_default().clone())
    }

    async fn acquire(
        &self,
        till: TillId,
    ) -> Result<tokio::sync::OwnedMutexGuard<()>, DomainError> {
        let lock = self.till_lock(till)?;
        tokio::time::timeout(self.lock_wait, lock.lock_owned())
            .await
            .map_err(|_| DomainError::Busy)
    }

    fn rehydrate(&self, session_id: SessionId) -> Result<TillSession, DomainError> {
        let events = self.store.load(session_id)?;
        let mut session = TillSession::empty(session_id);
        for event in &events {
            session.apply(event);
        }
        Ok(session)
    }

    fn execute(
        &self,
        session: &mut TillSession,
        command: SessionCommand,
    ) -> Result<Vec<posforge_till::SessionEvent>, DomainError> {
        let expected = ExpectedVersion::Exact(session.version());
        let events = session.handle(&command)?;
        self.store
            .append(session.id_typed(), events.clone(), expected)?;
        for event in &events {
            session.apply(event);
        }
        Ok(events)
    }

    /// Open a session on a till with a declared opening float.
    pub async fn open_till(
        &self,
        till: TillId,
        actor_id: ActorId,
        actor_name: &str,
        declared_amount: Amount,
    ) -> Result<SessionView, DomainError> {
        let _guard = self.acquire(till).await?;

        if let Some(open) = self.store.open_session(till)? {
            return Err(DomainError::conflict(format!(
                "{till} already has an open session ({open})"
            )));
        }

        let session_id = SessionId::new();
        let mut session = TillSession::empty(session_id);
        self.execute(
            &mut session,
            SessionCommand::Open(OpenSession {
                session_id,
                till,
                actor_id,
                actor_name: actor_name.to_string(),
                declared_amount,
                movement_id: MovementId::new(),
                occurred_at: Utc::now(),
            }),
        )?;

        tracing::info!(
            till = %till,
            session_id = %session_id,
            declared = %declared_amount,
            "till session opened"
        );
        Ok(SessionView::of(&session))
    }

    /// Append a movement to an open session.
    pub async fn record_movement(
        &self,
        session_id: SessionId,
        actor_id: ActorId,
        actor_name: &str,
        new: NewMovement,
    ) -> Result<Movement, DomainError> {
        // Till is only known after rehydration, so load once to find it,
        // then reload under the lock.
        let till = {
            let probe = self.rehydrate(session_id)?;
            if !probe.exists() {
                return Err(DomainError::not_found());
            }
            probe.till()
        };
        let _guard = self.acquire(till).await?;

        let mut session = self.rehydrate(session_id)?;
        let events = self.execute(
            &mut session,
            SessionCommand::Record(RecordMovement {
                session_id,
                movement_id: MovementId::new(),
                kind: new.kind,
                amount: new.amount,
                medium: new.medium,
                description: new.description,
                origin: new.origin,
                actor_id,
                actor_name: actor_name.to_string(),
                reverses: new.reverses,
                occurred_at: Utc::now(),
            }),
        )?;

        let movement = events[0].movement();
        tracing::info!(
            session_id = %session_id,
            movement_id = %movement.id,
            kind = %movement.kind,
            amount = %movement.amount,
            "movement recorded"
        );
        Ok(movement)
    }

    /// Close a session against a physically counted amount.
    pub async fn close_session(
        &self,
        session_id: SessionId,
        actor_id: ActorId,
        actor_name: &str,
        counted_amount: Amount,
    ) -> Result<ClosureSummary, DomainError> {
        let till = {
            let probe = self.rehydrate(session_id)?;
            if !probe.exists() {
                return Err(DomainError::not_found());
            }
            probe.till()
        };
        let _guard = self.acquire(till).await?;

        let mut session = self.rehydrate(session_id)?;
        let events = self.execute(
            &mut session,
            SessionCommand::Close(CloseSession {
                session_id,
                actor_id,
                actor_name: actor_name.to_string(),
                counted_amount,
                movement_id: MovementId::new(),
                occurred_at: Utc::now(),
            }),
        )?;

        let posforge_till::SessionEvent::Closed(closed) = &events[0] else {
            return Err(DomainError::invalid_state("close emitted no closure event"));
        };
        let reconciliation = closed.reconciliation;

        tracing::info!(
            till = %till,
            session_id = %session_id,
            expected = %reconciliation.expected,
            counted = %reconciliation.counted,
            difference = %reconciliation.difference,
            "till session closed"
        );
        Ok(ClosureSummary {
            reconciliation,
            session: SessionView::of(&session),
        })
    }

    /// Snapshot view of a session, open or closed.
    pub fn session(&self, session_id: SessionId) -> Result<SessionView, DomainError> {
        let session = self.rehydrate(session_id)?;
        if !session.exists() {
            return Err(DomainError::not_found());
        }
        Ok(SessionView::of(&session))
    }

    /// Current expected balance of a session.
    pub fn balance(&self, session_id: SessionId) -> Result<Amount, DomainError> {
        Ok(self.session(session_id)?.balance)
    }

    /// Whether a till currently has an open session, and which one.
    pub fn till_status(&self, till: TillId) -> Result<TillStatus, DomainError> {
        let session_id = self.store.open_session(till)?;
        Ok(TillStatus {
            till,
            open: session_id.is_some(),
            session_id,
        })
    }

    /// The open session view for a till, if any.
    pub fn open_session(&self, till: TillId) -> Result<Option<SessionView>, DomainError> {
        match self.store.open_session(till)? {
            Some(session_id) => Ok(Some(self.session(session_id)?)),
            None => Ok(None),
        }
    }

    /// Newest-first movement history across all sessions, filtered then
    /// paginated.
    pub fn history(&self, filter: &HistoryFilter) -> Result<HistoryPage, DomainError> {
        let movements = self.store.all_movements()?;
        Ok(query(&movements, filter))
    }
}

#[cfg(test)]
mod tests {
    use posforge_till::DEFAULT_PAGE_SIZE;

    use crate::store::InMemorySessionStore;

    use super::*;

    fn service() -> TillService {
        TillService::new(Arc::new(InMemorySessionStore::new()))
    }

    fn cashier() -> (ActorId, &'static str) {
        (ActorId::new(), "Cajero Uno")
    }

    fn ingreso(minor: i64) -> NewMovement {
        NewMovement {
            kind: MovementKind::Ingreso,
            amount: Amount::from_minor(minor),
            medium: Some(PaymentMedium::Cash),
            description: "venta mostrador".to_string(),
            origin: Origin::Venta,
            reverses: None,
        }
    }

    #[tokio::test]
    async fn full_lifecycle_with_reconciliation() {
        let svc = service();
        let (actor, name) = cashier();
        let till = TillId::new(1);

        let opened = svc
            .open_till(till, actor, name, Amount::from_minor(100_000))
            .await
            .unwrap();
        assert_eq!(opened.balance, Amount::from_minor(100_000));

        svc.record_movement(opened.session_id, actor, name, ingreso(50_000))
            .await
            .unwrap();
        svc.record_movement(
            opened.session_id,
            actor,
            name,
            NewMovement {
                kind: MovementKind::Egreso,
                amount: Amount::from_minor(20_000),
                medium: Some(PaymentMedium::Cash),
                description: "pago proveedor".to_string(),
                origin: Origin::Compra,
                reverses: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(svc.balance(opened.session_id).unwrap(), Amount::from_minor(130_000));

        let summary = svc
            .close_session(opened.session_id, actor, name, Amount::from_minor(129_000))
            .await
            .unwrap();
        assert_eq!(summary.reconciliation.difference, Amount::from_minor(-1_000));
        assert_eq!(summary.session.status, SessionStatus::Closed);
        assert!(svc.open_session(till).unwrap().is_none());
    }

    #[tokio::test]
    async fn double_open_on_one_till_is_a_conflict() {
        let svc = service();
        let (actor, name) = cashier();
        let till = TillId::new(2);

        svc.open_till(till, actor, name, Amount::ZERO).await.unwrap();
        let err = svc
            .open_till(till, actor, name, Amount::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn closing_frees_the_till_for_a_new_session() {
        let svc = service();
        let (actor, name) = cashier();
        let till = TillId::new(3);

        let first = svc
            .open_till(till, actor, name, Amount::from_minor(1_000))
            .await
            .unwrap();
        svc.close_session(first.session_id, actor, name, Amount::from_minor(1_000))
            .await
            .unwrap();

        let second = svc
            .open_till(till, actor, name, Amount::from_minor(2_000))
            .await
            .unwrap();
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(
            svc.till_status(till).unwrap().session_id,
            Some(second.session_id)
        );
    }

    #[tokio::test]
    async fn held_till_lock_turns_into_busy() {
        let svc = TillService::with_lock_wait(
            Arc::new(InMemorySessionStore::new()),
            Duration::from_millis(20),
        );
        let (actor, name) = cashier();
        let till = TillId::new(4);

        let lock = svc.till_lock(till).unwrap();
        let _held = lock.lock_owned().await;

        let err = svc
            .open_till(till, actor, name, Amount::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Busy));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let svc = service();
        let (actor, name) = cashier();

        let err = svc.session(SessionId::new()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound));

        let err = svc
            .close_session(SessionId::new(), actor, name, Amount::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn history_spans_sessions_newest_first() {
        let svc = service();
        let (actor, name) = cashier();

        let a = svc
            .open_till(TillId::new(5), actor, name, Amount::from_minor(1_000))
            .await
            .unwrap();
        let b = svc
            .open_till(TillId::new(6), actor, name, Amount::from_minor(2_000))
            .await
            .unwrap();
        svc.record_movement(a.session_id, actor, name, ingreso(500))
            .await
            .unwrap();
        svc.record_movement(b.session_id, actor, name, ingreso(700))
            .await
            .unwrap();

        let page = svc.history(&HistoryFilter::default()).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        // Newest first: the last recorded movement leads the page.
        assert_eq!(page.items[0].amount, Amount::from_minor(700));

        let only_a = svc
            .history(&HistoryFilter {
                session_id: Some(a.session_id),
                ..HistoryFilter::default()
            })
            .unwrap();
        assert_eq!(only_a.total, 2);
        assert!(only_a.items.iter().all(|m| m.session_id == a.session_id));
    }
}
