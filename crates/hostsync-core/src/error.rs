//! Error types for the hostsync system
//!
//! Every variant is scoped to a single sync invocation. None of them are
//! retried internally; the caller (the webhook) reports them and moves on.

use thiserror::Error;

/// Result type alias for hostsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the hostsync system
#[derive(Error, Debug)]
pub enum Error {
    /// The outbound inventory request could not be built (malformed endpoint)
    #[error("Request construction error: {0}")]
    RequestConstruction(String),

    /// Network failure or deadline expiry reaching the inventory or the store
    #[error("Transport error: {0}")]
    Transport(String),

    /// The inventory source answered with a non-success status
    #[error("Non-OK HTTP response: {0}")]
    UpstreamStatus(String),

    /// The inventory response body did not match the expected shape
    #[error("Error decoding response: {0}")]
    Decode(String),

    /// The target configuration record does not exist
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// The store rejected a write carrying a stale revision
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other failure reported by the configuration store
    #[error("Configuration store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a request construction error
    pub fn request_construction(msg: impl Into<String>) -> Self {
        Self::RequestConstruction(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an upstream status error
    pub fn upstream_status(status: impl Into<String>) -> Self {
        Self::UpstreamStatus(status.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a "record not found" error
    pub fn record_not_found(msg: impl Into<String>) -> Self {
        Self::RecordNotFound(msg.into())
    }

    /// Create a stale-revision conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable snake_case tag for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::RequestConstruction(_) => "request_construction",
            Error::Transport(_) => "transport",
            Error::UpstreamStatus(_) => "upstream_status",
            Error::Decode(_) => "decode",
            Error::RecordNotFound(_) => "record_not_found",
            Error::Conflict(_) => "conflict",
            Error::Store(_) => "store",
            Error::Config(_) => "config",
        }
    }
}
