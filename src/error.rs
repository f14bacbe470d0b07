//! Polyrelay Error Types
//!
//! Errors for the relay core and for individual provider calls.

use std::fmt;
use thiserror::Error;

/// Main error type for relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (invalid JSON, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rotation state could not be read or written
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// A required request field is missing
    #[error("{0}")]
    Validation(String),

    /// Something escaped the whole dispatch
    #[error("Dispatch failed: {0}")]
    Aggregate(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Config(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Config(format!("JSON parsing error: {}", err))
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// What went wrong inside a single provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// No credential configured for the selected slot
    MissingCredential,

    /// Transport-level failure (connect, DNS, TLS, ...)
    Request(String),

    /// Non-2xx HTTP status
    Status { status: u16, body: String },

    /// Response body was not what we expected
    Response(String),

    /// The call did not finish within the dispatch timeout
    Timeout,

    /// The adapter task panicked or was aborted
    Panicked(String),
}

/// A failure of one provider, isolated to that provider's result slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub provider: String,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind) -> Self {
        Self {
            provider: provider.into(),
            kind,
        }
    }

    pub fn missing_credential(provider: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::MissingCredential)
    }

    pub fn response(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Response(msg.into()))
    }

    pub fn timeout(provider: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Timeout)
    }

    /// Classify a reqwest error the same way for every adapter
    pub fn from_reqwest(provider: impl Into<String>, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else if err.is_connect() {
            ProviderErrorKind::Request(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            ProviderErrorKind::Response(format!("Failed to decode response: {}", err))
        } else {
            ProviderErrorKind::Request(err.to_string())
        };
        Self::new(provider, kind)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ProviderErrorKind::MissingCredential => write!(
                f,
                "[{}] no API key configured for the current rotation slot",
                self.provider
            ),
            ProviderErrorKind::Request(msg) => {
                write!(f, "[{}] request failed: {}", self.provider, msg)
            }
            ProviderErrorKind::Status { status, body } => write!(
                f,
                "[{}] request failed with status {}: {}",
                self.provider, status, body
            ),
            ProviderErrorKind::Response(msg) => {
                write!(f, "[{}] response error: {}", self.provider, msg)
            }
            ProviderErrorKind::Timeout => write!(f, "[{}] request timed out", self.provider),
            ProviderErrorKind::Panicked(msg) => {
                write!(f, "[{}] provider task failed: {}", self.provider, msg)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new(
            "Mistral",
            ProviderErrorKind::Status {
                status: 401,
                body: "unauthorized".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "[Mistral] request failed with status 401: unauthorized"
        );

        let err = ProviderError::timeout("Gemini");
        assert_eq!(err.to_string(), "[Gemini] request timed out");
    }

    #[test]
    fn test_relay_error_from_json() {
        let err: RelayError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
