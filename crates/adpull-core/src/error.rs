//! Unified error types for all layers of the application.

use thiserror::Error;

/// Unified error type for adpull.
///
/// This enum covers every failure surface of the tool: configuration,
/// the remote Graph API, transport, and local persistence. The
/// [`is_retryable`](AdpullError::is_retryable) and
/// [`is_rate_limit`](AdpullError::is_rate_limit) helpers drive the
/// scheduler's retry/backoff decisions.
#[derive(Error, Debug)]
pub enum AdpullError {
    /// Configuration error (bad or missing settings).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote API signaled throttling. Retried with a pool-wide pause.
    #[error("Rate limited by remote API: {0}")]
    RateLimited(String),

    /// Network or transport failure talking to the remote API.
    /// Retried without a pool pause.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote API rejected the request with an application error.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Local storage (SQLite or filesystem layout) error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Payload (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdpullError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a rate-limit error.
    #[must_use]
    pub fn rate_limited<T: Into<String>>(message: T) -> Self {
        Self::RateLimited(message.into())
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a storage error.
    #[must_use]
    pub fn storage<T: Into<String>>(message: T) -> Self {
        Self::Storage(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if a failed download may be re-attempted.
    ///
    /// Only remote throttling and transport failures qualify; API
    /// rejections, storage and serialization errors abort the run.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Transport(_))
    }

    /// Returns true if the remote rate limit was hit.
    ///
    /// Distinct from [`is_retryable`](Self::is_retryable): a rate-limit
    /// failure additionally pauses the worker that observed it, since
    /// every other worker is likely to hit the same limit immediately.
    #[must_use]
    pub const fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_retryable() {
        let err = AdpullError::rate_limited("code 17");
        assert!(err.is_retryable());
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_transport_is_retryable_without_rate_limit() {
        let err = AdpullError::transport("connection reset");
        assert!(err.is_retryable());
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn test_api_error_is_fatal() {
        let err = AdpullError::Api {
            code: 100,
            message: "Unsupported get request".into(),
        };
        assert!(!err.is_retryable());
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn test_storage_error_is_fatal() {
        let err = AdpullError::storage("database is locked");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_configuration_error_is_fatal() {
        let err = AdpullError::configuration("missing access token");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = AdpullError::Api {
            code: 17,
            message: "User request limit reached".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("17") && msg.contains("User request limit reached"));
    }
}
