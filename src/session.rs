use rocket::time::OffsetDateTime;
use std::{
    collections::HashMap,
    fmt::Display,
    hash::Hash,
    marker::{Send, Sync},
    sync::{Mutex, MutexGuard},
};

use crate::session_state::SessionState;

/**
The current request's session. When used as a request guard, it borrows the
session the fairing loaded for this request; every guard in the request sees
and updates the same state, and the fairing persists that state at the end
of the request.

Every request has a session. A first-time visitor (or the holder of an
expired or unknown cookie) gets a fresh session holding `T::default()`; the
guard only fails, with a 500 outcome, when loading the session hit a real
error (store failure, undecodable data).

# Type Parameters
* `T` - The session data type

# Example
```rust
use rocket_sessions::Session;
use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Serialize, Deserialize)]
struct UserSession {
    user_id: Option<String>,
}

#[rocket::get("/profile")]
fn profile(session: Session<UserSession>) -> String {
    match session.with(|data| data.user_id.clone()) {
        Some(user_id) => format!("Logged in as user {user_id}"),
        None => "Not logged in".to_string(),
    }
}

#[rocket::post("/login")]
fn login(mut session: Session<UserSession>) {
    session.set(UserSession {
        user_id: Some("123".to_owned()),
    });
}
```
*/
pub struct Session<'a, T>
where
    T: Send + Sync,
{
    /// Session state shared across the request
    state: &'a Mutex<SessionState<T>>,
}

impl<T> Display for Session<'_, T>
where
    T: Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Session(id: {:?})", self.lock_state().id())
    }
}

impl<'a, T> Session<'a, T>
where
    T: Send + Sync,
{
    pub(crate) fn new(state: &'a Mutex<SessionState<T>>) -> Self {
        Self { state }
    }

    /// Get the session ID. Will be `None` until the session is first saved
    /// at the end of a request.
    pub fn id(&self) -> Option<String> {
        self.lock_state().id().map(|s| s.to_owned())
    }

    /// When the session expires.
    pub fn expiry(&self) -> Option<OffsetDateTime> {
        self.lock_state().expiry()
    }

    /// Read the session data via a closure.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(self.lock_state().data())
    }

    /// Update the session data via a closure. The change is persisted at
    /// the end of the request.
    pub fn with_mut<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(self.lock_state().data_mut())
    }

    /// Replace the session data. The change is persisted at the end of the
    /// request.
    pub fn set(&mut self, new_data: T) {
        *self.lock_state().data_mut() = new_data;
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, SessionState<T>> {
        self.state.lock().expect("Failed to get session data lock")
    }
}

impl<T> Session<'_, T>
where
    T: Send + Sync + Clone,
{
    /// Get a copy of the session data.
    pub fn get(&self) -> T {
        self.lock_state().data().clone()
    }
}

impl<K, V> Session<'_, HashMap<K, V>>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync + Clone,
{
    /// Get the value of a key in the session data via cloning
    pub fn get_key<Q>(&self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Eq + Hash,
        K: std::borrow::Borrow<Q>,
    {
        self.with(|data| data.get(key).cloned())
    }

    /// Set the value of a key in the session data.
    pub fn set_key(&mut self, key: K, value: V) {
        self.with_mut(|data| {
            data.insert(key, value);
        });
    }

    /// Set multiple keys and values in the session data.
    pub fn set_keys<I>(&mut self, kv_iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.with_mut(|data| data.extend(kv_iter));
    }
}
