//! Error types for the loanboard-protocol crate.
//!
//! This module defines the errors that can occur when working with
//! protocol types: decoding failures and column set validation.

use thiserror::Error;

use crate::column::ColumnKey;

/// Errors that can occur during protocol operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Failed to deserialize a protocol type from JSON.
    #[error("failed to deserialize from JSON: {0}")]
    DeserializationFailed(#[source] serde_json::Error),

    /// The column is not part of the board's column set.
    #[error("unknown column: {0}")]
    UnknownColumn(ColumnKey),

    /// The same column key was listed twice.
    #[error("duplicate column: {0}")]
    DuplicateColumn(ColumnKey),

    /// A column set must contain at least one column.
    #[error("a board needs at least one column")]
    NoColumns,
}

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
