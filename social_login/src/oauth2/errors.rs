use thiserror::Error;

/// Configuration problems detected at startup. These are the only errors in
/// the crate that justify refusing to boot; everything at request time is a
/// recoverable outcome.
#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid endpoint URL for {provider}: {url}")]
    InvalidEndpoint { provider: String, url: String },
}

/// Failures of the authorization-code → access-token exchange.
#[derive(Debug, Error, Clone)]
pub enum ExchangeError {
    /// The provider rejected the exchange; carries provider-supplied error
    /// text when the response contained any, else a generic message.
    #[error("{0}")]
    Provider(String),

    /// Transport-level failure (timeout, connection error).
    #[error("Network failure during token exchange: {0}")]
    NetworkFailure(String),
}

/// Failures of the profile retrieval step.
#[derive(Debug, Error, Clone)]
pub enum ProfileError {
    /// The provider answered with a non-2xx status.
    #[error("Profile endpoint unavailable (status {0})")]
    Unavailable(u16),

    /// The response body could not be parsed into the provider's profile shape.
    #[error("Invalid profile response: {0}")]
    InvalidResponse(String),

    /// Transport-level failure (timeout, connection error).
    #[error("Network failure during profile fetch: {0}")]
    NetworkFailure(String),
}
