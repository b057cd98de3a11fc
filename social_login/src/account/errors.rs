use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum AccountError {
    /// Uniqueness violation: the account or link already exists. Surfaced to
    /// the user as a conflict, never retried automatically.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Notification delivery failure. Callers log and swallow this; login
    /// success never depends on it.
    #[error("Notification error: {0}")]
    Notification(String),
}
