//! Query error types
//!
//! Defines all error conditions that can occur during command parsing and
//! query execution.

use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Store layer error (I/O or record decode failure)
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// Command line could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Command word is not one of get/clicked/impressed/profit
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Result merge lock was poisoned by a panicking worker
    #[error("lock error: {0}")]
    Lock(String),
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        QueryError::Store(crate::store::StoreError::Io(err))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::UnknownCommand("ctr".to_string());
        assert_eq!(err.to_string(), "unknown command: ctr");
    }

    #[test]
    fn test_store_error_conversion() {
        let err: QueryError = crate::store::StoreError::ValueOverflow { field: 3 }.into();
        assert!(matches!(err, QueryError::Store(_)));
    }
}
