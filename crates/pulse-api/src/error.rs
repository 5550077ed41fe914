use thiserror::Error;

/// Errors produced by the remote client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 404 from the server before envelope decoding.
    #[error("Resource not found")]
    NotFound,

    /// 401 / 403 from the server.
    #[error("Unauthorized")]
    Unauthorized,

    /// Any other non-success HTTP status.
    #[error("Server returned status {0}")]
    Status(u16),

    /// The envelope arrived with `success = false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// `success = true` but the `data` field was missing.
    #[error("Response envelope missing data")]
    MissingData,

    /// Connect/timeout/TLS/body-decode failure from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;
