use std::{
    io::Cursor,
    marker::{Send, Sync},
    sync::{Arc, Mutex},
};

use bon::Builder;
use rocket::{
    fairing::Fairing,
    http::{ContentType, Cookie, CookieJar, Status},
    serde::{de::DeserializeOwned, Serialize},
    time::OffsetDateTime,
    Build, Data, Request, Response, Rocket,
};

use crate::{
    clock::{system_clock, Clock},
    codec::{JsonCodec, SessionCodec},
    error::{SessionError, SessionResult},
    guard::LocalCachedSession,
    id::{random_token, IdGenerator},
    session_state::SessionState,
    store::{memory::MemoryStore, SessionStore},
    SessionOptions,
};

/// Strategy invoked when a session operation fails while the fairing is
/// processing a request. Receives the request, the in-flight response, and
/// the error, and is expected to rewrite the response. The default responds
/// with 500 and the error message; replace it to avoid exposing error
/// detail to clients.
pub type ErrorHandler =
    Arc<dyn Fn(&Request<'_>, &mut Response<'_>, &SessionError) + Send + Sync>;

/**
A Rocket fairing that enables cookie-keyed server-side sessions, and the
manager for loading and saving them.

Every request is given a session: either the one named by its session
cookie, or a fresh one holding `T::default()`. Handlers read and update it
through the [`Session`](crate::Session) request guard. At the end of the
request the fairing saves the session and adds the session cookie to the
response.

# Type Parameters
* `T` - The type of your session data. Must be thread-safe, `Default` (the
  data of a fresh session), and serde-serializable (for the default JSON
  codec).

# Example
```rust,no_run
use rocket::time::Duration;
use rocket_sessions::{SessionManager, store::memory::MemoryStore};
use std::collections::HashMap;

type Visits = HashMap<String, u32>;

#[rocket::launch]
fn rocket() -> _ {
    // Use default settings with an in-memory store
    let session_fairing = SessionManager::<Visits>::default();

    // Or customize settings with the builder
    let custom_fairing = SessionManager::<Visits>::builder()
        .store(MemoryStore::default()) // or a custom store
        .with_options(|opt| {
            opt.cookie_name = "my_sid".to_string();
            opt.ttl = Duration::days(1);
        })
        .build();

    rocket::build()
        .attach(session_fairing)
        // ... other configuration ...
}
```
*/
#[derive(Builder)]
pub struct SessionManager<T: Default + Serialize + DeserializeOwned + Send + Sync + 'static> {
    /// Set the options directly. Alternatively, use `with_options` to
    /// customize the default options via a closure.
    #[builder(default)]
    pub(crate) options: SessionOptions,
    /// Set the session store. The default is an in-memory store.
    #[builder(default = Arc::new(MemoryStore::default()), with = |store: impl SessionStore + 'static| Arc::new(store))]
    pub(crate) store: Arc<dyn SessionStore>,
    /// Set the codec used to encode session data for the store. The default
    /// encodes to JSON.
    #[builder(default = Arc::new(JsonCodec), with = |codec: impl SessionCodec<T> + 'static| Arc::new(codec))]
    pub(crate) codec: Arc<dyn SessionCodec<T>>,
    /// Time source used to stamp fresh sessions. Override in tests to pin
    /// the current time.
    #[builder(default = system_clock(), with = |clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static| Arc::new(clock))]
    pub(crate) clock: Clock,
    /// Generator for new session ids. The default produces random 43
    /// character tokens; override to control the id format, or in tests to
    /// pin ids.
    #[builder(default = Arc::new(random_token), with = |generate: impl Fn() -> SessionResult<String> + Send + Sync + 'static| Arc::new(generate))]
    pub(crate) generate: IdGenerator,
    /// Called when a session operation fails during request processing. The
    /// default responds with 500 and the error message.
    #[builder(default = Arc::new(default_error_handler), with = |handler: impl Fn(&Request<'_>, &mut Response<'_>, &SessionError) + Send + Sync + 'static| Arc::new(handler))]
    pub(crate) error_handler: ErrorHandler,
}

impl<T> Default for SessionManager<T>
where
    T: Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a manager with default options, an in-memory store, and the
    /// JSON codec.
    fn default() -> Self {
        Self {
            options: SessionOptions::default(),
            store: Arc::new(MemoryStore::default()),
            codec: Arc::new(JsonCodec),
            clock: system_clock(),
            generate: Arc::new(random_token),
            error_handler: Arc::new(default_error_handler),
        }
    }
}

use session_manager_builder::{IsUnset, SetOptions, State};
impl<T, S> SessionManagerBuilder<T, S>
where
    T: Default + Serialize + DeserializeOwned + Send + Sync + 'static,
    S: State,
{
    /// Customize the [options](SessionOptions) via a closure. Any options
    /// that are not set will retain their default values.
    pub fn with_options<OptionsFn>(
        self,
        options_fn: OptionsFn,
    ) -> SessionManagerBuilder<T, SetOptions<S>>
    where
        S::Options: IsUnset,
        OptionsFn: FnOnce(&mut SessionOptions),
    {
        let mut options = SessionOptions::default();
        options_fn(&mut options);
        self.options(options)
    }
}

impl<T> SessionManager<T>
where
    T: Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a fresh session: default data, no id, expiring one TTL from
    /// now.
    pub fn fresh(&self) -> SessionState<T> {
        let mut state = SessionState::new(T::default());
        state.set_expiry((self.clock)() + self.options.ttl);
        state
    }

    /// Load the session `id` refers to. An unknown or expired id yields a
    /// fresh session; a record that exists but cannot be decoded is a hard
    /// error.
    pub async fn load(&self, id: &str) -> SessionResult<SessionState<T>> {
        let Some(record) = self.store.find(id).await? else {
            return Ok(self.fresh());
        };
        let data = self.codec.decode(&record.data)?;
        Ok(SessionState::restored(id.to_owned(), data, record.expiry))
    }

    /// Read the session for a request: load the session named by the
    /// session cookie, or start a fresh one if there is no cookie.
    pub async fn read(&self, jar: &CookieJar<'_>) -> SessionResult<SessionState<T>> {
        let Some(cookie) = jar.get(&self.options.cookie_name) else {
            rocket::debug!("No session cookie found. Creating fresh session...");
            return Ok(self.fresh());
        };
        rocket::debug!(
            "Got session id '{}' from cookie. Retrieving session...",
            cookie.value()
        );
        self.load(cookie.value()).await
    }

    /// Persist the session: assign an id and expiry if it has none yet,
    /// encode the data, and upsert it into the store. The state's id is
    /// filled in, so the session cookie can be built from it afterwards.
    pub async fn save(&self, state: &mut SessionState<T>) -> SessionResult<()> {
        let (id, expiry) = self.prepare(state)?;
        let raw = self.codec.encode(state.data())?;
        self.store.upsert(&id, &raw, expiry).await
    }

    /// Remove the session `id` refers to from the store. Removing an
    /// unknown id is a no-op.
    pub async fn delete(&self, id: &str) -> SessionResult<()> {
        self.store.delete(id).await
    }

    /// Write the session at the end of a request: save it and add the
    /// session cookie to the jar.
    pub async fn write(
        &self,
        jar: &CookieJar<'_>,
        state: &mut SessionState<T>,
    ) -> SessionResult<()> {
        self.save(state).await?;
        if let Some(cookie) = self.cookie(state) {
            jar.add(cookie);
        }
        Ok(())
    }

    /// Build the session cookie for a saved session: the id as the value,
    /// the session expiry as `Expires`, and the remaining attributes from
    /// the [options](SessionOptions). Returns `None` if the session has no
    /// id yet.
    pub fn cookie(&self, state: &SessionState<T>) -> Option<Cookie<'static>> {
        let id = state.id().filter(|id| !id.is_empty())?;
        let mut cookie = Cookie::build((self.options.cookie_name.clone(), id.to_owned()))
            .http_only(self.options.http_only)
            .path(self.options.path.clone())
            .same_site(self.options.same_site)
            .secure(self.options.secure);
        if let Some(expiry) = state.expiry() {
            cookie = cookie.expires(expiry);
        }
        Some(cookie.build())
    }

    /// Assign an id and expiry to the session if it lacks them, and return
    /// the pair the session will be stored under. Idempotent; an assigned
    /// id is never regenerated.
    fn prepare(&self, state: &mut SessionState<T>) -> SessionResult<(String, OffsetDateTime)> {
        let id = match state.id() {
            Some(id) => id.to_owned(),
            None => {
                let id = (self.generate)()?;
                state.set_id(id.clone());
                id
            }
        };
        let expiry = match state.expiry() {
            Some(expiry) => expiry,
            None => {
                let expiry = (self.clock)() + self.options.ttl;
                state.set_expiry(expiry);
                expiry
            }
        };
        Ok((id, expiry))
    }
}

/// Default error handler: respond with 500 and the error message.
fn default_error_handler(_req: &Request<'_>, res: &mut Response<'_>, err: &SessionError) {
    let body = err.to_string();
    res.set_status(Status::InternalServerError);
    res.set_header(ContentType::Plain);
    res.set_sized_body(body.len(), Cursor::new(body));
}

#[rocket::async_trait]
impl<T> Fairing for SessionManager<T>
where
    T: Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn info(&self) -> rocket::fairing::Info {
        use rocket::fairing::Kind;
        rocket::fairing::Info {
            name: "Rocket Sessions",
            kind: Kind::Ignite | Kind::Request | Kind::Response | Kind::Singleton,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> Result<Rocket<Build>, Rocket<Build>> {
        Ok(rocket.manage::<SessionManager<T>>(SessionManager {
            options: self.options.clone(),
            store: self.store.clone(),
            codec: self.codec.clone(),
            clock: self.clock.clone(),
            generate: self.generate.clone(),
            error_handler: self.error_handler.clone(),
        }))
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let cached: LocalCachedSession<T> = match self.read(req.cookies()).await {
            Ok(state) => (Mutex::new(state), None),
            Err(e) => {
                rocket::warn!("Error while loading session: {e}");
                (Mutex::default(), Some(e))
            }
        };
        req.local_cache(|| cached);
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let (cached_state, load_error): &LocalCachedSession<T> =
            req.local_cache(|| (Mutex::default(), None));

        // A session that failed to load is never saved
        if let Some(e) = load_error {
            (self.error_handler)(req, res, e);
            return;
        }

        // Take the state out of the cache; the lock must be released before
        // awaiting the store
        let mut state = {
            let mut guard = cached_state.lock().expect("session state lock poisoned");
            std::mem::take(&mut *guard)
        };

        if let Err(e) = self.write(req.cookies(), &mut state).await {
            rocket::error!("Error while saving session {:?}: {e}", state.id());
            (self.error_handler)(req, res, &e);
        }
    }
}
