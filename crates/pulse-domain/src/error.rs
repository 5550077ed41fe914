use thiserror::Error;

/// Errors surfaced at the repository boundary.
///
/// Callers branch on the variant to pick a recovery policy: only
/// [`DataError::Transport`] is worth retrying; the rest describe outcomes that
/// will not change on a replay of the same request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The record does not exist, locally or remotely.
    #[error("Record not found")]
    NotFound,

    /// The server refused the request for lack of (valid) credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request never produced a usable response (connect, timeout, TLS,
    /// malformed body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered but reported a logical failure
    /// (`success = false` in the envelope).
    #[error("Server rejected request: {0}")]
    ServerRejected(String),

    /// The request was rejected before it left the device.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The local cache failed (SQLite error, poisoned lock).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DataError {
    /// Whether replaying the same operation can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Transport(_))
    }
}

/// Convenience alias used throughout the data layer.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_is_retryable() {
        assert!(DataError::Transport("timeout".into()).is_retryable());
        assert!(!DataError::NotFound.is_retryable());
        assert!(!DataError::Unauthorized.is_retryable());
        assert!(!DataError::ServerRejected("nope".into()).is_retryable());
        assert!(!DataError::Validation("empty title".into()).is_retryable());
        assert!(!DataError::Storage("disk full".into()).is_retryable());
    }
}
