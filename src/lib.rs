//! # Adindex
//!
//! Offset-indexed analytics engine for append-only ad click/impression
//! logs. Secondary indexes over byte offsets answer keyed analytic
//! queries without scanning the whole file.
//!
//! ## Features
//!
//! - **Zero-copy record store**: memory-mapped log file, lines addressed
//!   by byte offset
//! - **Multi-key indexes**: user, ad, and (user, ad) pair indexes built in
//!   one pass, keys extracted without decoding records
//! - **Parallel queries**: candidate offsets partitioned across a rayon
//!   worker pool, one merge point per operation
//! - **Lazy decoding**: records materialize only for offsets a query
//!   actually selected
//!
//! ## Modules
//!
//! - [`store`]: memory-mapped record store, field extraction, record decode
//! - [`index`]: ordered-multimap indexes and the single-pass builder
//! - [`query`]: the four analytic operations
//! - [`repl`]: line-oriented command loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adindex::index::IndexBuilder;
//! use adindex::query::QueryEngine;
//! use adindex::store::RecordStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Map the log and build the indexes once
//!     let store = RecordStore::open("clicks.txt")?;
//!     let index = IndexBuilder::default().build(&store)?;
//!
//!     // Query
//!     let engine = QueryEngine::new(&store, &index);
//!     let (clicks, impressions) = engine.get(490234, 21093, 18827, 1, 2)?;
//!     println!("{clicks} clicks over {impressions} impressions");
//!
//!     for user_id in engine.profit(21093, 0.35)? {
//!         println!("user {user_id}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod index;
pub mod query;
pub mod repl;
pub mod store;

// Re-export top-level types for convenience
pub use store::{Field, Lines, Record, RecordStore, StoreError, StoreResult, DEFAULT_DELIMITER};

pub use index::{BTreeMultimap, IndexBuilder, IndexSet, OrderedMultimap};

pub use query::{Creative, ImpressedAds, QueryEngine, QueryError, QueryResult};

pub use repl::{parse_command, Command};

pub use config::{Config, ConfigError, DataConfig, LoggingConfig, QueryConfig};
