//! In-memory session store

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use rocket::{async_trait, time::OffsetDateTime};

use crate::{
    clock::{system_clock, Clock},
    error::SessionResult,
};

use super::interface::{SessionRecord, SessionStore};

/// In-memory store for sessions, backed by a mutex-guarded map. This is the
/// default store of the manager, designed for local development and testing
/// rather than production use.
///
/// Expired records are reported as absent but stay in the map until they are
/// overwritten or deleted; there is no background eviction.
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create an empty store with a custom clock for expiry checks.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            sessions: Mutex::default(),
            clock,
        }
    }

    /// Number of records currently held, counting expired ones that haven't
    /// been overwritten or deleted yet.
    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    /// Whether the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.lock_sessions().is_empty()
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.sessions.lock().expect("session map lock poisoned")
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find(&self, id: &str) -> SessionResult<Option<SessionRecord>> {
        let now = (self.clock)();
        Ok(self
            .lock_sessions()
            .get(id)
            .filter(|record| record.expiry > now)
            .cloned())
    }

    async fn upsert(&self, id: &str, data: &[u8], expiry: OffsetDateTime) -> SessionResult<()> {
        let record = SessionRecord {
            data: data.to_vec(),
            expiry,
        };
        self.lock_sessions().insert(id.to_owned(), record);
        Ok(())
    }

    async fn delete(&self, id: &str) -> SessionResult<()> {
        self.lock_sessions().remove(id);
        Ok(())
    }
}
