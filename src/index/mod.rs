//! Adindex Index Structures
//!
//! Secondary indexes over byte offsets into the record store:
//!
//! - **multimap**: the [`OrderedMultimap`] contract and its B-tree backing
//! - **builder**: the single-pass [`IndexBuilder`] producing an [`IndexSet`]
//!
//! # Architecture
//!
//! ```text
//! Query: "everything user 123 clicked"
//!        ↓
//! user index: equal_range(123) → [offset, offset, ...]
//!        ↓
//! RecordStore::line_at(offset) → Record::parse → aggregate
//! ```
//!
//! Three indexes are kept over the same file: by user id, by ad id, and by
//! the (user id, ad id) pair. The pair index answers "which ads has this
//! user seen" with one range scan instead of decoding the user's records.

mod builder;
mod multimap;

pub use builder::{IndexBuilder, IndexSet};
pub use multimap::{BTreeMultimap, OrderedMultimap};
