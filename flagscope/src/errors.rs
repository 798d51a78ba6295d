//! Error types for flagscope.
//!
//! Missing context is never an error: callers outside a request scope simply
//! receive `None`. The errors here cover derivation failures and client
//! registry lookups.

use thiserror::Error;

/// The main error type for flagscope operations.
#[derive(Debug, Error)]
pub enum FlagScopeError {
    /// The context deriver failed for a request.
    #[error("{0}")]
    Derivation(#[from] DerivationError),

    /// A client lookup failed.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// A context value could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error raised when a context deriver fails.
///
/// The deriver's own error is kept as the source, unchanged.
#[derive(Debug, Error)]
#[error("Failed to derive evaluation context: {source}")]
pub struct DerivationError {
    #[source]
    source: anyhow::Error,
}

impl DerivationError {
    /// Wraps the error returned by a deriver.
    #[must_use]
    pub fn new(source: anyhow::Error) -> Self {
        Self { source }
    }

    /// Returns the deriver's error.
    #[must_use]
    pub fn inner(&self) -> &anyhow::Error {
        &self.source
    }

    /// Unwraps into the deriver's error.
    #[must_use]
    pub fn into_inner(self) -> anyhow::Error {
        self.source
    }
}

/// Errors from the client registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No client is registered under the token.
    #[error("No client registered for token '{token}'")]
    UnknownClient {
        /// The token that was looked up.
        token: String,
    },

    /// The token does not follow the `client:<name>` format.
    #[error("Invalid client token '{token}': expected 'client:<name>'")]
    InvalidToken {
        /// The malformed token.
        token: String,
    },
}

impl RegistryError {
    /// Creates an unknown client error.
    #[must_use]
    pub fn unknown_client(token: impl Into<String>) -> Self {
        Self::UnknownClient {
            token: token.into(),
        }
    }

    /// Creates an invalid token error.
    #[must_use]
    pub fn invalid_token(token: impl Into<String>) -> Self {
        Self::InvalidToken {
            token: token.into(),
        }
    }
}

/// Result alias for flagscope operations.
pub type Result<T, E = FlagScopeError> = std::result::Result<T, E>;
