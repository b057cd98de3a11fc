//! Error type for the coordination layer.

use thiserror::Error;

use crate::account::AccountError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Infrastructure failures while coordinating a login flow. User-recoverable
/// conditions are not errors; they are [`super::LoginOutcome`] values.
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// The requested provider is not in the registry (unknown or disabled).
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Error from the state-token or pending-data storage
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error from session operations
    #[error("Session error: {0}")]
    Session(SessionError),

    /// Error from account or link store operations
    #[error("Account error: {0}")]
    Account(AccountError),
}

impl CoordinationError {
    /// Log the error and return self, allowing method chaining at the point
    /// where the error is surfaced.
    pub fn log(self) -> Self {
        match &self {
            Self::UnknownProvider(p) => tracing::error!("Unknown provider: {}", p),
            Self::Storage(msg) => tracing::error!("Storage error: {}", msg),
            Self::Session(err) => tracing::error!("Session error: {}", err),
            Self::Account(err) => tracing::error!("Account error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::Session(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<StorageError> for CoordinationError {
    fn from(err: StorageError) -> Self {
        let error = Self::Storage(err.to_string());
        tracing::error!("{}", error);
        error
    }
}

impl From<AccountError> for CoordinationError {
    fn from(err: AccountError) -> Self {
        let error = Self::Account(err);
        tracing::error!("{}", error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<CoordinationError>();
    }

    #[test]
    fn test_error_display() {
        let err = CoordinationError::UnknownProvider("twitter".to_string());
        assert_eq!(err.to_string(), "Unknown provider: twitter");

        let err = CoordinationError::Storage("cache down".to_string());
        assert_eq!(err.to_string(), "Storage error: cache down");
    }

    #[test]
    fn test_from_session_error() {
        let session_err = SessionError::Storage("session storage error".to_string());
        let err: CoordinationError = session_err.into();

        match err {
            CoordinationError::Session(SessionError::Storage(msg)) => {
                assert_eq!(msg, "session storage error");
            }
            other => panic!("Wrong error type: {other:?}"),
        }
    }

    #[test]
    fn test_error_log_returns_self() {
        let err = CoordinationError::Storage("test error".to_string()).log();
        match err {
            CoordinationError::Storage(msg) => assert_eq!(msg, "test error"),
            other => panic!("Wrong error type after logging: {other:?}"),
        }
    }
}
