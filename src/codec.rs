//! Encoding of session data for storage

use rocket::serde::{de::DeserializeOwned, json::serde_json, Serialize};

use crate::error::{SessionError, SessionResult};

/// Converts session data to and from the raw bytes kept in a
/// [store](crate::store). Implement this to store session data in a
/// different format than the default JSON.
pub trait SessionCodec<T>: Send + Sync {
    /// Encode session data to bytes.
    fn encode(&self, data: &T) -> SessionResult<Vec<u8>>;

    /// Decode session data from bytes. Malformed input must yield a
    /// [`SessionError::Decode`], never a panic.
    fn decode(&self, raw: &[u8]) -> SessionResult<T>;
}

/// The default codec: session data as JSON via serde_json.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl<T> SessionCodec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, data: &T) -> SessionResult<Vec<u8>> {
        serde_json::to_vec(data).map_err(|e| SessionError::Encode(Box::new(e)))
    }

    fn decode(&self, raw: &[u8]) -> SessionResult<T> {
        serde_json::from_slice(raw).map_err(|e| SessionError::Decode(Box::new(e)))
    }
}
