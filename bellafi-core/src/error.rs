//! Error types for the widget

use thiserror::Error;

/// Widget-wide error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BellafiError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BellafiError {
    pub fn api(msg: impl Into<String>) -> Self {
        BellafiError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        BellafiError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        BellafiError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        BellafiError::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        BellafiError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        BellafiError::Internal(msg.into())
    }

    /// Whether the failure happened before a response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, BellafiError::Network(_))
    }
}

/// Result type alias for widget operations
pub type BellafiResult<T> = Result<T, BellafiError>;
