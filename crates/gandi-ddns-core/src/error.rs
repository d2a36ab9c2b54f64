//! Error types for the Gandi DDNS client
//!
//! The variants follow the failure points of a reconciliation pass:
//! configuration, address fetch, live record read, record write and the
//! local address cache. Only [`Error::Config`] is fatal to a run; every
//! other error is caught at the per-protocol boundary by the reconciler.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS client
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The address-echo service could not produce a usable address
    #[error("Unable to fetch current address: {0}")]
    Fetch(String),

    /// Reading the live record from the DNS provider failed
    #[error("Unable to read DNS record: {0}")]
    RecordRead(String),

    /// Updating the record at the DNS provider failed
    #[error("Unable to update DNS record: {0}")]
    RecordWrite(String),

    /// Local address cache errors
    #[error("Address cache error: {0}")]
    Cache(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an address fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a record read error
    pub fn record_read(msg: impl Into<String>) -> Self {
        Self::RecordRead(msg.into())
    }

    /// Create a record write error
    pub fn record_write(msg: impl Into<String>) -> Self {
        Self::RecordWrite(msg.into())
    }

    /// Create an address cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole run rather than one protocol
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// The message without the variant's prefix
    ///
    /// Status lines supply their own context, so they embed this instead of
    /// the full `Display` output.
    pub fn detail(&self) -> String {
        match self {
            Self::Config(msg)
            | Self::Fetch(msg)
            | Self::RecordRead(msg)
            | Self::RecordWrite(msg)
            | Self::Cache(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
