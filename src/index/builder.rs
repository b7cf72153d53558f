//! Index Builder - one pass over the store, three indexes out
//!
//! Streams every line of the [`RecordStore`](crate::store::RecordStore)
//! exactly once, extracts the key fields, and inserts `(key, line_offset)`
//! pairs into the user, ad, and (user, ad) pair indexes. Records are never
//! decoded here; only the two key fields are touched.
//!
//! A line that fails field extraction aborts the whole build with that
//! error. A partially indexed file would silently produce wrong query
//! answers, so no partial index ever escapes this module.

use crate::index::multimap::{BTreeMultimap, OrderedMultimap};
use crate::store::record::Field;
use crate::store::{extract, RecordStore, StoreResult, DEFAULT_DELIMITER};
use std::time::Instant;

/// The set of indexes built from one record store
///
/// Built once, read-only afterwards; safe to share across query workers.
/// All three indexes are derived from the same single pass over the same
/// immutable file, so they are consistent by construction.
#[derive(Debug, Default)]
pub struct IndexSet {
    user: BTreeMultimap<u32, u64>,
    ad: BTreeMultimap<u32, u64>,
    user_ad: BTreeMultimap<(u32, u32), u64>,
    lines: u64,
}

impl IndexSet {
    /// Index keyed by user id
    pub fn user(&self) -> &BTreeMultimap<u32, u64> {
        &self.user
    }

    /// Index keyed by ad id
    pub fn ad(&self) -> &BTreeMultimap<u32, u64> {
        &self.ad
    }

    /// Index keyed by (user id, ad id)
    pub fn user_ad(&self) -> &BTreeMultimap<(u32, u32), u64> {
        &self.user_ad
    }

    /// Number of non-blank lines indexed
    pub fn line_count(&self) -> u64 {
        self.lines
    }
}

/// Builds an [`IndexSet`] from a record store
#[derive(Debug, Clone, Copy)]
pub struct IndexBuilder {
    delim: u8,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            delim: DEFAULT_DELIMITER,
        }
    }
}

impl IndexBuilder {
    pub fn new(delim: u8) -> Self {
        Self { delim }
    }

    /// Run the single indexing pass
    ///
    /// Blank lines are skipped; they never receive an index entry. Any
    /// extraction failure is returned as-is and the partially built
    /// indexes are dropped.
    pub fn build(&self, store: &RecordStore) -> StoreResult<IndexSet> {
        let start = Instant::now();
        let mut set = IndexSet::default();

        for (offset, line) in store.lines() {
            if line.is_empty() {
                continue;
            }

            let user_id = self.extract_key(line, Field::UserId)?;
            let ad_id = self.extract_key(line, Field::AdId)?;

            set.user.insert(user_id, offset);
            set.ad.insert(ad_id, offset);
            set.user_ad.insert((user_id, ad_id), offset);
            set.lines += 1;
        }

        tracing::info!(
            lines = set.lines,
            users = set.user.key_count(),
            ads = set.ad.key_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "index build complete"
        );

        Ok(set)
    }

    fn extract_key(&self, line: &[u8], field: Field) -> StoreResult<u32> {
        let value = extract(line, field as usize, self.delim)?;
        u32::try_from(value).map_err(|_| crate::store::StoreError::ValueOverflow {
            field: field as usize,
        })
    }
}
