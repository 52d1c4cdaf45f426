use std::{any::type_name, sync::Mutex};

use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    serde::{de::DeserializeOwned, Serialize},
    Request,
};

use crate::{error::SessionError, session_state::SessionState, SessionManager, Session};

/// Type of the cached session state in Rocket's request local cache: the
/// state shared by every guard in the request, plus the error (if any) from
/// loading it.
pub(crate) type LocalCachedSession<T> = (Mutex<SessionState<T>>, Option<SessionError>);

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Session<'r, T>
where
    T: Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// The load error, when the session could not be retrieved
    type Error = &'r SessionError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Ensures the fairing is attached; panics with instructions otherwise
        get_manager::<T>(req.rocket());

        let (cached_state, load_error): &LocalCachedSession<T> =
            req.local_cache(|| (Mutex::default(), None));

        // Don't run handlers against a session that failed to load; the
        // fairing will invoke the error handler on the way out
        if let Some(e) = load_error {
            return Outcome::Error((Status::InternalServerError, e));
        }

        Outcome::Success(Session::new(cached_state))
    }
}

/// Get the session manager from Rocket state
#[inline(always)]
fn get_manager<T>(rocket: &rocket::Rocket<rocket::Orbit>) -> &SessionManager<T>
where
    T: Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    rocket.state::<SessionManager<T>>().unwrap_or_else(|| {
        panic!(
            "The SessionManager<{}> fairing should be attached to the server",
            type_name::<T>()
        )
    })
}
