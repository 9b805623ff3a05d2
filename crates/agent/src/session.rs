//! Session Store
//!
//! Sessions are keyed by an opaque key supplied by the transport. Each session
//! owns one `EventRequest` and a monotonic turn counter.
//!
//! The store is an injected collaborator (`SessionStore`). The default
//! `InMemorySessionStore` keeps one mutex per session: the read-modify-write of
//! an `advance` is serialized per key, while different keys only contend on
//! the map lookup.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use event_planner_core::{CollectionState, Error, EventRequest, Result, SlotName};

/// Mutable state of one session
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub key: String,
    pub request: EventRequest,
    /// Incremented on every `advance`, including empty utterances
    pub turn: u64,
    pub state: CollectionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    last_activity: Instant,
}

impl SessionRecord {
    pub fn new(key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            request: EventRequest::new(),
            turn: 0,
            state: CollectionState::Collecting,
            created_at: now,
            updated_at: now,
            last_activity: Instant::now(),
        }
    }

    /// Update last activity
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
        self.updated_at = Utc::now();
    }

    /// Check if the session has been idle longer than `timeout`
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_key: self.key.clone(),
            request: self.request.clone(),
            turn: self.turn,
            state: self.state,
            missing_slots: self.request.missing_slots(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only view of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_key: String,
    pub request: EventRequest,
    pub turn: u64,
    pub state: CollectionState,
    pub missing_slots: Vec<SlotName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shared handle to one session's state
pub type SessionHandle = Arc<Mutex<SessionRecord>>;

/// Session store trait for pluggable backends
pub trait SessionStore: Send + Sync {
    /// Existing session for `key`, or a new empty one
    fn get_or_create(&self, key: &str) -> Result<SessionHandle>;

    fn get(&self, key: &str) -> Option<SessionHandle>;

    /// Remove a session; returns whether it existed
    fn remove(&self, key: &str) -> bool;

    fn count(&self) -> usize;

    /// Remove sessions idle longer than `timeout`; returns how many were removed
    fn evict_idle(&self, timeout: Duration) -> usize;
}

/// In-memory session store (default)
///
/// Sessions do not survive restarts.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    max_sessions: usize,
    session_timeout: Duration,
}

impl InMemorySessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self::with_config(max_sessions, Duration::from_secs(3600))
    }

    /// Store with a custom idle timeout, used to make room when full
    pub fn with_config(max_sessions: usize, session_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            session_timeout,
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    fn evict_idle_internal(sessions: &mut HashMap<String, SessionHandle>, timeout: Duration) -> usize {
        // Sessions locked by an in-flight turn are busy, not idle
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, handle)| {
                handle
                    .try_lock()
                    .map_or(false, |record| record.is_expired(timeout))
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            sessions.remove(key);
            tracing::info!(session = %key, "Expired session");
        }

        expired.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_or_create(&self, key: &str) -> Result<SessionHandle> {
        if let Some(handle) = self.sessions.read().get(key) {
            return Ok(Arc::clone(handle));
        }

        let mut sessions = self.sessions.write();

        // Another writer may have created it between the locks
        if let Some(handle) = sessions.get(key) {
            return Ok(Arc::clone(handle));
        }

        if sessions.len() >= self.max_sessions {
            Self::evict_idle_internal(&mut sessions, self.session_timeout);

            if sessions.len() >= self.max_sessions {
                return Err(Error::Session("Max sessions reached".to_string()));
            }
        }

        let handle = Arc::new(Mutex::new(SessionRecord::new(key)));
        sessions.insert(key.to_string(), Arc::clone(&handle));
        tracing::info!(session = %key, "Created session");

        Ok(handle)
    }

    fn get(&self, key: &str) -> Option<SessionHandle> {
        self.sessions.read().get(key).cloned()
    }

    fn remove(&self, key: &str) -> bool {
        let removed = self.sessions.write().remove(key).is_some();
        if removed {
            tracing::info!(session = %key, "Removed session");
        }
        removed
    }

    fn count(&self) -> usize {
        self.sessions.read().len()
    }

    fn evict_idle(&self, timeout: Duration) -> usize {
        let mut sessions = self.sessions.write();
        Self::evict_idle_internal(&mut sessions, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_returns_same_session() {
        let store = InMemorySessionStore::new(10);
        let first = store.get_or_create("abc").unwrap();
        first.lock().turn = 3;

        let second = store.get_or_create("abc").unwrap();
        assert_eq!(second.lock().turn, 3);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_unknown_key_is_absent() {
        let store = InMemorySessionStore::new(10);
        assert!(store.get("missing").is_none());
        assert!(!store.remove("missing"));
    }

    #[test]
    fn test_session_remove() {
        let store = InMemorySessionStore::new(10);
        store.get_or_create("abc").unwrap();
        assert!(store.remove("abc"));
        assert!(store.get("abc").is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_capacity_limit() {
        let store = InMemorySessionStore::new(2);
        store.get_or_create("a").unwrap();
        store.get_or_create("b").unwrap();
        let err = store.get_or_create("c").unwrap_err();
        assert!(matches!(err, Error::Session(_)));

        // Existing keys are still reachable at capacity
        assert!(store.get_or_create("a").is_ok());
    }

    #[test]
    fn test_capacity_frees_idle_sessions() {
        let store = InMemorySessionStore::with_config(1, Duration::ZERO);
        store.get_or_create("a").unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get_or_create("b").is_ok());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_evict_idle() {
        let store = InMemorySessionStore::new(10);
        store.get_or_create("a").unwrap();
        store.get_or_create("b").unwrap();

        assert_eq!(store.evict_idle(Duration::from_secs(60)), 0);

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.evict_idle(Duration::ZERO), 2);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_busy_session_not_evicted() {
        let store = InMemorySessionStore::new(10);
        let handle = store.get_or_create("a").unwrap();
        let _guard = handle.lock();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.evict_idle(Duration::ZERO), 0);
    }

    #[test]
    fn test_snapshot() {
        let mut record = SessionRecord::new("abc");
        record.request.fill_event_type("Wedding");
        record.turn = 1;
        let snapshot = record.snapshot();
        assert_eq!(snapshot.session_key, "abc");
        assert_eq!(snapshot.state, CollectionState::Collecting);
        assert_eq!(snapshot.missing_slots.len(), 3);
    }
}
