use std::collections::HashMap;
use std::sync::RwLock;

use posforge_core::{DomainError, ExpectedVersion, SessionId, TillId};
use posforge_till::{Movement, SessionEvent};

/// Durable store contract for till sessions.
///
/// Guarantees the engine relies on: append order is preserved per session
/// and across the global movement log, a successful `append` implies the
/// events are durable, and subsequent reads observe them (read-your-writes).
/// Reads return consistent snapshots; a partially appended batch is never
/// visible.
pub trait SessionStore: Send + Sync {
    /// Append events to a session stream, checking the optimistic version
    /// expectation (number of events already in the stream).
    fn append(
        &self,
        session_id: SessionId,
        events: Vec<SessionEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<(), DomainError>;

    /// Load a session's full event stream (empty if the session is unknown).
    fn load(&self, session_id: SessionId) -> Result<Vec<SessionEvent>, DomainError>;

    /// The currently open session for a till, if any.
    fn open_session(&self, till: TillId) -> Result<Option<SessionId>, DomainError>;

    /// Snapshot of every movement across all sessions, in global append
    /// order (oldest first).
    fn all_movements(&self) -> Result<Vec<Movement>, DomainError>;
}

#[derive(Debug, Default)]
struct StoreInner {
    streams: HashMap<SessionId, Vec<SessionEvent>>,
    /// till -> currently open session. Maintained from Opened/Closed events.
    open_by_till: HashMap<TillId, SessionId>,
    /// Global append-order movement log feeding history queries.
    movement_log: Vec<Movement>,
}

/// In-memory append-only session store.
///
/// Intended for tests/dev and single-process deployments. Not optimized for
/// performance.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<StoreInner>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl core::fmt::Debug) -> DomainError {
    DomainError::conflict("store lock poisoned")
}

impl SessionStore for InMemorySessionStore {
    fn append(
        &self,
        session_id: SessionId,
        events: Vec<SessionEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.write().map_err(poisoned)?;

        let current = inner
            .streams
            .get(&session_id)
            .map(|s| s.len() as u64)
            .unwrap_or(0);
        expected_version.check(current)?;

        // Validate the whole batch before touching anything so a rejected
        // append never leaves a partial batch behind.
        for event in &events {
            if let SessionEvent::Opened(e) = event {
                // Second line of defense behind the service's per-till
                // lock; the race should already have been serialized.
                if inner.open_by_till.contains_key(&e.till) {
                    return Err(DomainError::conflict(format!(
                        "{} already has an open session",
                        e.till
                    )));
                }
            }
        }

        for event in events {
            match &event {
                SessionEvent::Opened(e) => {
                    inner.open_by_till.insert(e.till, e.session_id);
                }
                SessionEvent::MovementRecorded(_) => {}
                SessionEvent::Closed(e) => {
                    let till = inner
                        .open_by_till
                        .iter()
                        .find(|(_, open)| **open == e.session_id)
                        .map(|(till, _)| *till);
                    if let Some(till) = till {
                        inner.open_by_till.remove(&till);
                    }
                }
            }

            inner.movement_log.push(event.movement());
            inner.streams.entry(session_id).or_default().push(event);
        }

        Ok(())
    }

    fn load(&self, session_id: SessionId) -> Result<Vec<SessionEvent>, DomainError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.streams.get(&session_id).cloned().unwrap_or_default())
    }

    fn open_session(&self, till: TillId) -> Result<Option<SessionId>, DomainError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.open_by_till.get(&till).copied())
    }

    fn all_movements(&self) -> Result<Vec<Movement>, DomainError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.movement_log.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use posforge_core::{ActorId, Amount, MovementId};
    use posforge_till::SessionOpened;

    use super::*;

    fn opened_event(till: TillId, session_id: SessionId) -> SessionEvent {
        SessionEvent::Opened(SessionOpened {
            session_id,
            till,
            actor_id: ActorId::new(),
            actor_name: "Cajero".to_string(),
            declared_amount: Amount::from_minor(1_000),
            movement_id: MovementId::new(),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn append_tracks_open_index_and_movement_log() {
        let store = InMemorySessionStore::new();
        let till = TillId::new(1);
        let session_id = SessionId::new();

        store
            .append(
                session_id,
                vec![opened_event(till, session_id)],
                ExpectedVersion::Exact(0),
            )
            .unwrap();

        assert_eq!(store.open_session(till).unwrap(), Some(session_id));
        assert_eq!(store.all_movements().unwrap().len(), 1);
        assert_eq!(store.load(session_id).unwrap().len(), 1);
    }

    #[test]
    fn stale_expected_version_is_a_conflict() {
        let store = InMemorySessionStore::new();
        let till = TillId::new(2);
        let session_id = SessionId::new();

        store
            .append(
                session_id,
                vec![opened_event(till, session_id)],
                ExpectedVersion::Exact(0),
            )
            .unwrap();

        let err = store
            .append(
                SessionId::new(),
                vec![opened_event(TillId::new(3), session_id)],
                ExpectedVersion::Exact(5),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn rejected_batch_leaves_nothing_behind() {
        let store = InMemorySessionStore::new();
        let till = TillId::new(6);
        let first = SessionId::new();
        let second = SessionId::new();

        store
            .append(first, vec![opened_event(till, first)], ExpectedVersion::Exact(0))
            .unwrap();

        let movement = opened_event(till, second).movement();
        let batch = vec![
            SessionEvent::MovementRecorded(posforge_till::MovementRecorded { movement }),
            opened_event(till, second),
        ];
        let err = store
            .append(second, batch, ExpectedVersion::Exact(0))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // The conflicting batch must not be partially visible.
        assert!(store.load(second).unwrap().is_empty());
        assert_eq!(store.all_movements().unwrap().len(), 1);
        assert_eq!(store.open_session(till).unwrap(), Some(first));
    }

    #[test]
    fn double_open_on_same_till_is_rejected_at_the_store() {
        let store = InMemorySessionStore::new();
        let till = TillId::new(4);
        let first = SessionId::new();
        let second = SessionId::new();

        store
            .append(first, vec![opened_event(till, first)], ExpectedVersion::Exact(0))
            .unwrap();
        let err = store
            .append(second, vec![opened_event(till, second)], ExpectedVersion::Exact(0))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
