//! Error types

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can happen while loading, saving, or deleting sessions.
///
/// An absent, expired, or unrecognized session is *not* an error: stores
/// report it as `Ok(None)` and the manager starts a fresh session. These
/// variants cover genuine failures only.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Error encoding the session data for storage
    #[error("Failed to encode session data: {0}")]
    Encode(Box<dyn std::error::Error + Send + Sync>),
    /// A stored record exists but its data could not be decoded. This is
    /// a hard error and is never treated as a missing session.
    #[error("Failed to decode session data: {0}")]
    Decode(Box<dyn std::error::Error + Send + Sync>),
    /// The identifier generator failed (e.g. the OS entropy source was
    /// unavailable), so a new session could not be created.
    #[error("Failed to generate session id: {0}")]
    Generate(Box<dyn std::error::Error + Send + Sync>),
    /// A generic error from the storage backend. This error type can be
    /// used when implementing a custom session store.
    #[error("Storage backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    #[cfg(feature = "sqlx_sqlite")]
    #[error("Sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
}
