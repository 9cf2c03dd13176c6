//! Error types for failsift
//!
//! Record-level problems (malformed input lines, outputs that normalize to
//! nothing) are never errors — they are dropped or logged by the ingest
//! stage. Errors here are reserved for conditions that abort a run:
//! invalid configuration, I/O failures, and internal invariant breaks.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TriageError>;

/// Main error type for failsift
#[derive(Error, Debug)]
pub enum TriageError {
    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Input file could not be read
    #[error("Cannot read input {path}: {source}")]
    InputIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be written
    #[error("Cannot write output {path}: {source}")]
    OutputIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline stage broke its contract (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TriageError {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an input I/O error
    pub fn input_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::InputIo {
            path: path.into(),
            source,
        }
    }

    /// Create an output I/O error
    pub fn output_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::OutputIo {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is an I/O failure (input or output side)
    pub fn is_io(&self) -> bool {
        matches!(self, Self::InputIo { .. } | Self::OutputIo { .. })
    }
}
