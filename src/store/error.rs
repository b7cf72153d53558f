//! Record store error types
//!
//! Defines all errors that can occur in the store layer: opening the
//! backing file, extracting single fields, and decoding full records.

use thiserror::Error;

/// Errors that can occur in the record store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed (missing or unreadable log file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line has fewer delimiter-separated fields than requested
    #[error("field {field} out of range: line has only {available} fields")]
    FieldOutOfRange { field: usize, available: usize },

    /// A field's decimal value does not fit its target width
    #[error("value overflow in field {field}")]
    ValueOverflow { field: usize },

    /// A line could not be decoded into a full record
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
