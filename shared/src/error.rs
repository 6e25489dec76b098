//! Error types for DateThinker Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in DateThinker Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed input the caller can correct
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Places provider unreachable or returned an unexpected failure
    #[error("Places provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Places provider rejected the call because of quota or rate limits
    #[error("Places provider quota exceeded: {0}")]
    ProviderQuotaExceeded(String),

    /// Backing store failure, original message preserved
    #[error("Store error: {0}")]
    Store(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 400,
            Error::Auth(_) => 401,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidRequest("city".into()).status_code(), 400);
        assert_eq!(Error::NotFound("plan".into()).status_code(), 404);
        assert_eq!(Error::Auth("no session".into()).status_code(), 401);
        assert_eq!(Error::ProviderUnavailable("down".into()).status_code(), 500);
        assert_eq!(Error::ProviderQuotaExceeded("limit".into()).status_code(), 500);
        assert_eq!(Error::Store("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_store_message_preserved() {
        let err = Error::Store("connection reset by peer".into());
        assert!(err.to_string().contains("connection reset by peer"));
    }
}
