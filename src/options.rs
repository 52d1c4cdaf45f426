use rocket::time::Duration;

/// Options for configuring the session cookie and lifetime.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// The name of the cookie holding the session id (default: `"sid"`)
    pub cookie_name: String,
    /// The session cookie's `HttpOnly` attribute (default: `true`)
    pub http_only: bool,
    /// The session cookie's `Path` attribute (default: `"/"`)
    pub path: String,
    /// The session cookie's `SameSite` attribute (default: `SameSite::Lax`)
    pub same_site: rocket::http::SameSite,
    /// The session cookie's `Secure` attribute (default: `false`).
    /// Enable this when serving over HTTPS.
    pub secure: bool,
    /// How long sessions live, counted from creation. Also sets the cookie's
    /// `Expires` attribute (default: 7 days)
    pub ttl: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            cookie_name: "sid".to_owned(),
            http_only: true,
            path: "/".to_owned(),
            same_site: rocket::http::SameSite::Lax,
            secure: false,
            ttl: Duration::days(7),
        }
    }
}
