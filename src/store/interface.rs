//! Shared interface for session stores

use std::sync::Arc;

use rocket::{async_trait, time::OffsetDateTime};

use crate::error::SessionResult;

/// A session as kept in a store: the encoded data and the absolute time at
/// which it stops being valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    /// Encoded session data
    pub data: Vec<u8>,
    /// Absolute expiry time. At or past this instant the record counts as
    /// absent.
    pub expiry: OffsetDateTime,
}

/// Trait representing a session backend store. You can use your own session
/// store by implementing this trait.
///
/// # Contract
/// - `find` reports unknown, expired, and tampered ids as `Ok(None)`. The
///   `Err` branch is reserved for infrastructure failures (connection lost,
///   corrupt storage, and the like).
/// - The expiry check belongs to the store: a record whose expiry is at or
///   before the current time must be reported as `Ok(None)`. Expired records
///   don't have to be deleted on read; removal is a separate maintenance
///   concern (see e.g. `SqliteStore::cleanup`).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up the session record for `id`.
    async fn find(&self, id: &str) -> SessionResult<Option<SessionRecord>>;

    /// Insert or overwrite the record for `id`. Concurrent upserts of the
    /// same id are last-writer-wins.
    async fn upsert(&self, id: &str, data: &[u8], expiry: OffsetDateTime) -> SessionResult<()>;

    /// Remove the record for `id`. Removing an unknown id is a no-op, not
    /// an error.
    async fn delete(&self, id: &str) -> SessionResult<()>;
}

/// Any shared store is itself a store. This lets one instance serve both a
/// session manager and an externally scheduled maintenance job.
#[async_trait]
impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    async fn find(&self, id: &str) -> SessionResult<Option<SessionRecord>> {
        self.as_ref().find(id).await
    }

    async fn upsert(&self, id: &str, data: &[u8], expiry: OffsetDateTime) -> SessionResult<()> {
        self.as_ref().upsert(id, data, expiry).await
    }

    async fn delete(&self, id: &str) -> SessionResult<()> {
        self.as_ref().delete(id).await
    }
}
