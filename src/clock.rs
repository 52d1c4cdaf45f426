use std::sync::Arc;

use rocket::time::OffsetDateTime;

/// Shared time source. The manager uses it to stamp fresh sessions, and the
/// built-in stores use it for expiry checks. Replace it in tests to pin the
/// current time.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// A [`Clock`] reading the system time in UTC.
pub fn system_clock() -> Clock {
    Arc::new(OffsetDateTime::now_utc)
}
