//! Error types for engine operations.

use thiserror::Error;

/// Errors produced while reading or writing properties.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed `.properties` text, such as a bad `\uXXXX` escape.
    #[error("malformed properties text at line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// Malformed XML or a document that violates the properties schema.
    #[error("invalid XML properties document at offset {offset}: {reason}")]
    Xml { offset: usize, reason: String },

    /// The requested character encoding is not supported.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// A key holds a null-like value, which neither format can represent.
    #[error("property {key:?} has no value and cannot be written")]
    NullValue { key: String },

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
