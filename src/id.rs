use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, TryRngCore};

use crate::error::{SessionError, SessionResult};

/// Generator for new session ids. The default is [`random_token`]; replace
/// it to control the id format, or in tests to pin the generated id.
pub type IdGenerator = Arc<dyn Fn() -> SessionResult<String> + Send + Sync>;

/// Generate a random session id: 32 bytes from the OS entropy source,
/// encoded as URL-safe base64 without padding (43 characters).
///
/// Fails with [`SessionError::Generate`] if the entropy source is
/// unavailable.
pub fn random_token() -> SessionResult<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| SessionError::Generate(Box::new(e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
