//! Scriptable session store for tests

use rocket::{async_trait, time::OffsetDateTime};

use crate::error::SessionResult;

use super::interface::{SessionRecord, SessionStore};

type FindFn = dyn Fn(&str) -> SessionResult<Option<SessionRecord>> + Send + Sync;
type UpsertFn = dyn Fn(&str, &[u8], OffsetDateTime) -> SessionResult<()> + Send + Sync;
type DeleteFn = dyn Fn(&str) -> SessionResult<()> + Send + Sync;

/**
A store whose operations are supplied as closures, for tests that need to
script store behavior (most usefully, the error paths). An operation without
a handler panics when called.

# Example
```rust
use rocket_sessions::error::SessionError;
use rocket_sessions::store::mock::MockStore;

let store = MockStore::new()
    .on_find(|_id| Err(SessionError::Backend("connection reset".into())))
    .on_upsert(|_id, _data, _expiry| Ok(()))
    .on_delete(|_id| Ok(()));
```
*/
#[derive(Default)]
pub struct MockStore {
    find_fn: Option<Box<FindFn>>,
    upsert_fn: Option<Box<UpsertFn>>,
    delete_fn: Option<Box<DeleteFn>>,
}

impl MockStore {
    /// Create a mock store with no handlers set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler backing [`SessionStore::find`].
    pub fn on_find<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> SessionResult<Option<SessionRecord>> + Send + Sync + 'static,
    {
        self.find_fn = Some(Box::new(f));
        self
    }

    /// Set the handler backing [`SessionStore::upsert`].
    pub fn on_upsert<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[u8], OffsetDateTime) -> SessionResult<()> + Send + Sync + 'static,
    {
        self.upsert_fn = Some(Box::new(f));
        self
    }

    /// Set the handler backing [`SessionStore::delete`].
    pub fn on_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> SessionResult<()> + Send + Sync + 'static,
    {
        self.delete_fn = Some(Box::new(f));
        self
    }
}

#[async_trait]
impl SessionStore for MockStore {
    async fn find(&self, id: &str) -> SessionResult<Option<SessionRecord>> {
        match &self.find_fn {
            Some(f) => f(id),
            None => panic!("MockStore::find called with no on_find handler set"),
        }
    }

    async fn upsert(&self, id: &str, data: &[u8], expiry: OffsetDateTime) -> SessionResult<()> {
        match &self.upsert_fn {
            Some(f) => f(id, data, expiry),
            None => panic!("MockStore::upsert called with no on_upsert handler set"),
        }
    }

    async fn delete(&self, id: &str) -> SessionResult<()> {
        match &self.delete_fn {
            Some(f) => f(id),
            None => panic!("MockStore::delete called with no on_delete handler set"),
        }
    }
}
