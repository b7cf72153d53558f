//! Adindex Query Engine
//!
//! The analytic layer on top of the indexes:
//!
//! - **engine**: the four operations (`get`, `clicked`, `impressed`,
//!   `profit`) with parallel candidate decoding
//! - **error**: error types
//!
//! Ordering and deduplication of every result are part of the output
//! contract, not an implementation detail: the same input file must
//! produce bit-identical answers regardless of worker count.

pub mod engine;
pub mod error;

pub use engine::{Creative, ImpressedAds, QueryEngine};
pub use error::{QueryError, QueryResult};
