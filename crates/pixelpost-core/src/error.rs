//! Error types for the event dispatch pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the event dispatch pipeline.
///
/// Configuration failures are raised before any network I/O; transport
/// failures are propagated to the caller as-is, with no retry and no
/// translation.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller named a destination that is not in the registry.
    #[error("destination configuration not found for key: {name}")]
    ConfigurationNotFound {
        /// The destination name that failed to resolve
        name: String,
    },

    /// The host supplied invalid or incomplete configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong with the configuration
        message: String,
    },

    /// The outbound call failed before a well-formed response was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body content
        body: String,
    },

    /// The envelope could not be serialized to the wire format.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a configuration-not-found error for a destination name.
    pub fn configuration_not_found(name: impl Into<String>) -> Self {
        Self::ConfigurationNotFound { name: name.into() }
    }

    /// Creates an invalid-configuration error from a message.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration { message: message.into() }
    }

    /// True when the failure happened before any network I/O was attempted.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationNotFound { .. } | Self::InvalidConfiguration { .. }
        )
    }
}
