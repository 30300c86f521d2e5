//! Error types for store operations.

use oprops_engine::EngineError;
use thiserror::Error;

/// Errors that can occur while loading, storing or restoring a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed text escapes, malformed XML or a schema violation.
    #[error("invalid properties format: {0}")]
    Format(String),

    /// I/O error from the caller's stream, passed through unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted representation that cannot be turned back into a store.
    #[error("invalid persisted state: {0}")]
    InvalidState(String),

    /// The requested XML encoding is not supported.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// A key holds a null-like value, which cannot be written out.
    #[error("property {key:?} has no value and cannot be written")]
    NullValue { key: String },
}

impl From<EngineError> for StoreError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Io(e) => Self::Io(e),
            EngineError::UnsupportedEncoding(label) => Self::UnsupportedEncoding(label),
            EngineError::NullValue { key } => Self::NullValue { key },
            format @ (EngineError::Format { .. } | EngineError::Xml { .. }) => {
                Self::Format(format.to_string())
            }
        }
    }
}

/// Convenience type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
