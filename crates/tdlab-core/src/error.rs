//! Error types for the tdlab core library

use thiserror::Error;

/// Core error type for tdlab operations
#[derive(Error, Debug)]
pub enum RLError {
    /// Unrecognized coding scheme name
    #[error("Unsupported coding scheme: {0}")]
    UnsupportedScheme(String),

    /// Unrecognized representation, policy, trace or algorithm tag
    #[error("Unsupported {kind}: {name}")]
    UnsupportedOption {
        /// Which option family the name was looked up in
        kind: &'static str,
        /// The offending name
        name: String,
    },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// Observation or action space unsuitable for the requested agent
    #[error("Invalid space: {0}")]
    InvalidSpace(String),

    /// Invalid or incompatible parameter combination
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid action
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RLError {
    /// Shorthand for a [`RLError::Configuration`] error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error belongs to the fatal construction-time family
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedScheme(_)
                | Self::UnsupportedOption { .. }
                | Self::DimensionMismatch { .. }
                | Self::InvalidSpace(_)
                | Self::Configuration(_)
        )
    }
}

/// Result type alias for tdlab operations
pub type Result<T> = std::result::Result<T, RLError>;

/// Fail with [`RLError::DimensionMismatch`] unless `actual == expected`
pub fn ensure_dims(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(RLError::DimensionMismatch { expected, actual })
    }
}
