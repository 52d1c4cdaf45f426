#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

/*!
# Overview
Cookie-keyed server-side sessions for Rocket applications.

- The browser only ever holds an opaque session id in a cookie; the session
  data lives server-side in a pluggable [store](crate::store).
- Every request has a session: returning visitors get the session their
  cookie names, everyone else gets a fresh one holding `T::default()`. There
  is no "logged out" special case to handle in routes.
- Makes use of Rocket's request-local cache so the store is read once per
  request, no matter how many times the [Session] guard is used, and written
  once at the end of the request.
- The session id, wire format, time source, and error responses are all
  replaceable: bring your own [`SessionStore`](crate::store::SessionStore),
  [`SessionCodec`](crate::codec::SessionCodec), id generator, or clock.

# Session lifecycle

A session is created the first time a request without a (valid) session
cookie is answered: the fairing saves the request's session state and sets
the session cookie. The id is assigned at that first save, so
[`Session::id`] is `None` while the first request is still being handled.

Sessions live for a fixed TTL from creation (default: 7 days, see
[SessionOptions]); the expiry is not extended on later requests. An expired
or unknown id is indistinguishable from having no cookie at all: the visitor
just gets a fresh session.

Expired data is dropped lazily. The built-in stores report expired records
as absent but leave them in place; see the store's own maintenance hooks
(e.g. `SqliteStore::cleanup`) for pruning them on a schedule.

# Usage

## Basic setup

```rust,no_run
use rocket::routes;
use rocket_sessions::{Session, SessionManager};
use std::collections::HashMap;

type MySession = HashMap<String, String>;

#[rocket::launch]
fn rocket() -> _ {
    rocket::build()
        // attach the `SessionManager` fairing, passing in your session data type
        .attach(SessionManager::<MySession>::default())
        .mount("/", routes![login])
}

// use the `Session` request guard in a route handler
#[rocket::post("/login")]
fn login(mut session: Session<MySession>) {
    session.set_key("user_id".to_owned(), "123".to_owned());
}
```

## Typed session data

Any `Default + Serialize + Deserialize` type works as session data. Updates
made through the guard are persisted automatically at the end of the
request:

```rust
use rocket_sessions::Session;
use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Serialize, Deserialize)]
struct Preferences {
    theme: String,
    visits: u32,
}

#[rocket::get("/visits")]
fn visits(mut session: Session<Preferences>) -> String {
    let count = session.with_mut(|prefs| {
        prefs.visits += 1;
        prefs.visits
    });
    format!("You have visited {count} times")
}
```

## Request guard auth

The [Session] guard succeeds for fresh sessions too, so authentication is a
property of the session *data*, not of the guard. Layer your own request
guard on top of it using Rocket's request guard system:

```rust
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use rocket_sessions::Session;
use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Serialize, Deserialize)]
struct AppSession {
    user_id: Option<String>,
}

struct LoggedIn {
    user_id: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for LoggedIn {
    type Error = &'r str;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let session = match req.guard::<Session<AppSession>>().await {
            Outcome::Success(session) => session,
            _ => return Outcome::Error((Status::InternalServerError, "session unavailable")),
        };
        match session.with(|data| data.user_id.clone()) {
            Some(user_id) => Outcome::Success(LoggedIn { user_id }),
            None => Outcome::Error((Status::Unauthorized, "Not logged in")),
        }
    }
}

#[rocket::get("/user")]
fn get_user(auth: LoggedIn) -> String {
    format!("Logged in as user {}!", auth.user_id)
}
```

## Deleting sessions

The manager is available through Rocket's managed state, e.g. for revoking a
session by id:

```rust
use rocket::State;
use rocket_sessions::SessionManager;
use std::collections::HashMap;

type MySession = HashMap<String, String>;

#[rocket::post("/revoke/<sid>")]
async fn revoke(sid: &str, manager: &State<SessionManager<MySession>>) -> &'static str {
    if let Err(e) = manager.delete(sid).await {
        rocket::warn!("Failed to delete session: {e}");
        return "Failed to revoke session";
    }
    "Session revoked"
}
```

Note that deleting the *current* request's session does not stop the
end-of-request save, which would quietly re-create it. To log a visitor out,
clear the session data instead (`session.set(Default::default())`); the
session then persists but carries nothing.

# Stores

| Store | Feature flag | Use case |
|-------|--------------|----------|
| [`store::memory::MemoryStore`] | Built-in (default) | Development, testing |
| `store::sqlite::SqliteStore` | `sqlx_sqlite` | Production, persistent sessions |
| [`store::mock::MockStore`] | Built-in | Scripting store behavior in tests |

## Custom stores

To implement a custom store, implement the
[`SessionStore`](crate::store::SessionStore) trait. Stores deal in encoded
bytes and are shared across all session data types:

```rust
use rocket::{async_trait, time::OffsetDateTime};
use rocket_sessions::error::SessionResult;
use rocket_sessions::store::{SessionRecord, SessionStore};

pub struct MyCustomStore {}

#[async_trait]
impl SessionStore for MyCustomStore {
    async fn find(&self, id: &str) -> SessionResult<Option<SessionRecord>> {
        // Look up the record; report absent/expired/tampered ids as Ok(None)
        todo!()
    }

    async fn upsert(&self, id: &str, data: &[u8], expiry: OffsetDateTime) -> SessionResult<()> {
        // Insert or overwrite the record
        todo!()
    }

    async fn delete(&self, id: &str) -> SessionResult<()> {
        // Remove the record; unknown ids are a no-op
        todo!()
    }
}
```

### Implementation tips

1. **Thread safety**: all stores must be `Send + Sync`
2. **Absence vs failure**: only return `Err` for infrastructure failures;
   unknown, expired, and tampered ids are `Ok(None)`
3. **Expiry**: the expiry check belongs to the store; a record with
   `expiry <= now` must be reported as `Ok(None)`
4. **Error handling**: use [`error::SessionError::Backend`] for custom
   errors

# Error handling

Store, codec, and id-generator failures are never swallowed: a failed load
aborts routing, a failed save is reported after the handler ran, and in both
cases the manager's error handler rewrites the response (by default to a 500
carrying the error message). Replace the handler to control what clients
see:

```rust
use rocket::http::Status;
use rocket_sessions::SessionManager;
use std::collections::HashMap;

let fairing = SessionManager::<HashMap<String, String>>::builder()
    .error_handler(|_req, res, err| {
        rocket::error!("session failure: {err}");
        res.set_status(Status::ServiceUnavailable);
    })
    .build();
```

# Feature flags

These features can be enabled as shown
[in Cargo's documentation](https://doc.rust-lang.org/cargo/reference/features.html).

| Name    | Description    |
|---------|----------------|
| `sqlx_sqlite` | A session store using SQLite via the [sqlx](https://docs.rs/crate/sqlx) crate. |
*/

mod clock;
mod guard;
mod id;
mod manager;
mod options;
mod session;
mod session_state;

pub mod codec;
pub mod error;
pub mod store;

pub use clock::{system_clock, Clock};
pub use id::{random_token, IdGenerator};
pub use manager::{ErrorHandler, SessionManager, SessionManagerBuilder};
pub use options::SessionOptions;
pub use session::Session;
pub use session_state::SessionState;
