//! Vault error types using thiserror 2.0.
//!
//! Transport failures are errors; server-reported failures are not. A 4xx/5xx
//! response or an `errors` envelope surfaces as [`crate::VaultOutcome::Failure`].

use thiserror::Error;

/// Errors raised while reading or rendering a [`crate::Member`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemberError {
    /// A field held a JSON value of the wrong type
    #[error("Field `{field}` has the wrong type, expected {expected}")]
    InvalidType {
        /// Field name
        field: &'static str,
        /// Expected JSON type
        expected: &'static str,
    },

    /// A date field could not be read as an offset-carrying timestamp
    #[error("Field `{field}` is not a timezone-aware timestamp: {value}")]
    InvalidTimestamp {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// A field required for the write payload is unset
    #[error("Field `{0}` is required")]
    MissingField(&'static str),
}

/// Vault client errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Connection, TLS, timeout or body read failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Member could not be rendered or parsed
    #[error(transparent)]
    Member(#[from] MemberError),

    /// Response body was not the JSON the Vault documents
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    /// Check if the error came from the network rather than from local data.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
