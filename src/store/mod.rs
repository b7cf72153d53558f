//! Adindex Record Store
//!
//! This module provides read access to the raw log file:
//!
//! - **mmap**: memory-mapped record store with line-offset addressing
//! - **extract**: zero-copy single-field extraction for the indexing pass
//! - **record**: full twelve-field record decode, done lazily at query time
//! - **error**: error types
//!
//! # Architecture
//!
//! ```text
//! Index Path:
//!   line bytes → extract(user_id/ad_id) → (key, offset) into the indexes
//!
//! Query Path:
//!   offset → line_at → Record::parse → filter/aggregate
//! ```
//!
//! The store is opened once per session and never mutated; every slice it
//! hands out borrows from the underlying map.

pub mod error;
pub mod extract;
pub mod mmap;
pub mod record;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use extract::extract;
pub use mmap::{Lines, RecordStore};
pub use record::{Field, Record, FIELD_COUNT};

/// Default field delimiter of the log format (tab-separated)
pub const DEFAULT_DELIMITER: u8 = b'\t';
