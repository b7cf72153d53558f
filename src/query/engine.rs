//! Query Engine
//!
//! Implements the four analytic operations over the built indexes and the
//! record store:
//!
//! 1. Index lookup for the candidate offsets
//! 2. Parallel decode of only the selected lines
//! 3. Aggregation with one merge point per operation
//!
//! # Execution Pipeline
//!
//! ```text
//! Operation → equal_range/range → par_chunks → decode+filter → merge → sort
//! ```
//!
//! The store and indexes are shared-read and never mutated here, and the
//! record decoder is pure, so candidate offsets partition freely across the
//! rayon pool. Each worker folds into a private partial result and merges
//! it under a single mutex-guarded critical section; nothing is locked per
//! element. A record that fails to decode aborts the whole query with the
//! decode error.

use crate::index::{IndexSet, OrderedMultimap};
use crate::query::error::{QueryError, QueryResult};
use crate::store::{Record, RecordStore, StoreResult, DEFAULT_DELIMITER};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Instant;

/// Offsets handed to one worker task at a time
const DEFAULT_CHUNK_SIZE: usize = 1024;

/// The creative tuple grouped by [`QueryEngine::impressed`]:
/// (advertiser id, keyword id, title id, description id)
pub type Creative = (u16, u32, u32, u32);

/// Result of [`QueryEngine::impressed`]: ad id → distinct creatives,
/// both in ascending order
pub type ImpressedAds = BTreeMap<u32, BTreeSet<Creative>>;

/// Read-only query engine over one store and its indexes
pub struct QueryEngine<'a> {
    store: &'a RecordStore,
    index: &'a IndexSet,
    delim: u8,
    chunk_size: usize,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(store: &'a RecordStore, index: &'a IndexSet) -> Self {
        Self {
            store,
            index,
            delim: DEFAULT_DELIMITER,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the field delimiter (must match the one the indexes were built with)
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delim = delim;
        self
    }

    /// Set how many offsets each worker task takes at once
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Sum clicks and impressions of one user's records matching
    /// `(ad_id, query_id, position, depth)` exactly
    ///
    /// Returns `(0, 0)` when nothing matches.
    pub fn get(
        &self,
        user_id: u32,
        ad_id: u32,
        query_id: u32,
        position: u8,
        depth: u8,
    ) -> QueryResult<(u64, u64)> {
        let start = Instant::now();
        let offsets = self.index.user().equal_range(&user_id);
        let totals = Mutex::new((0u64, 0u64));

        offsets
            .par_chunks(self.chunk_size)
            .try_for_each(|chunk| -> QueryResult<()> {
                let mut clicks = 0u64;
                let mut impressions = 0u64;

                for &offset in chunk {
                    let record = self.decode(offset)?;
                    if record.matches(ad_id, query_id, position, depth) {
                        clicks += u64::from(record.click);
                        impressions += u64::from(record.impression);
                    }
                }

                let mut merged = lock(&totals)?;
                merged.0 += clicks;
                merged.1 += impressions;
                Ok(())
            })?;

        let totals = into_inner(totals)?;
        tracing::debug!(
            user_id,
            ad_id,
            candidates = offsets.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "get"
        );
        Ok(totals)
    }

    /// All distinct `(ad_id, query_id)` pairs the user clicked, ascending
    pub fn clicked(&self, user_id: u32) -> QueryResult<Vec<(u32, u32)>> {
        let start = Instant::now();
        let offsets = self.index.user().equal_range(&user_id);
        let pairs = Mutex::new(BTreeSet::new());

        offsets
            .par_chunks(self.chunk_size)
            .try_for_each(|chunk| -> QueryResult<()> {
                let mut local = BTreeSet::new();

                for &offset in chunk {
                    let record = self.decode(offset)?;
                    if record.is_clicked() {
                        local.insert((record.ad_id, record.query_id));
                    }
                }

                lock(&pairs)?.extend(local);
                Ok(())
            })?;

        let pairs = into_inner(pairs)?;
        tracing::debug!(
            user_id,
            candidates = offsets.len(),
            hits = pairs.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "clicked"
        );
        Ok(pairs.into_iter().collect())
    }

    /// Ads seen by both users, each with its distinct impressed creatives
    ///
    /// The ad intersection comes from two pair-index range scans and is
    /// symmetric in the arguments; creatives are collected from records of
    /// either user with `impression > 0`. An ad whose shared records carry
    /// no impressions produces no group.
    pub fn impressed(&self, user_a: u32, user_b: u32) -> QueryResult<ImpressedAds> {
        let start = Instant::now();
        let ads_a = self.ads_seen(user_a);
        let ads_b = self.ads_seen(user_b);
        let shared: Vec<u32> = ads_a.intersection(&ads_b).copied().collect();

        let grouped = Mutex::new(BTreeMap::new());

        shared.par_iter().try_for_each(|&ad_id| -> QueryResult<()> {
            let mut creatives = BTreeSet::new();

            for user_id in [user_a, user_b] {
                for &offset in self.index.user_ad().equal_range(&(user_id, ad_id)) {
                    let record = self.decode(offset)?;
                    if record.impression > 0 {
                        creatives.insert(record.creative());
                    }
                }
            }

            if !creatives.is_empty() {
                lock(&grouped)?.insert(ad_id, creatives);
            }
            Ok(())
        })?;

        let grouped = into_inner(grouped)?;
        tracing::debug!(
            user_a,
            user_b,
            shared_ads = shared.len(),
            grouped = grouped.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "impressed"
        );
        Ok(grouped)
    }

    /// Users whose click-through ratio on `ad_id` strictly exceeds
    /// `ctr_threshold`, ascending and deduplicated
    ///
    /// A user's ratio is `sum(click) / sum(impression)` over their records
    /// for this ad, and 0 when the impression sum is 0.
    pub fn profit(&self, ad_id: u32, ctr_threshold: f64) -> QueryResult<Vec<u32>> {
        let start = Instant::now();
        let offsets = self.index.ad().equal_range(&ad_id);
        let totals: Mutex<HashMap<u32, (u64, u64)>> = Mutex::new(HashMap::new());

        offsets
            .par_chunks(self.chunk_size)
            .try_for_each(|chunk| -> QueryResult<()> {
                let mut local: HashMap<u32, (u64, u64)> = HashMap::new();

                for &offset in chunk {
                    let record = self.decode(offset)?;
                    let entry = local.entry(record.user_id).or_insert((0, 0));
                    entry.0 += u64::from(record.click);
                    entry.1 += u64::from(record.impression);
                }

                let mut merged = lock(&totals)?;
                for (user_id, (clicks, impressions)) in local {
                    let entry = merged.entry(user_id).or_insert((0, 0));
                    entry.0 += clicks;
                    entry.1 += impressions;
                }
                Ok(())
            })?;

        let totals = into_inner(totals)?;
        let mut users: Vec<u32> = totals
            .into_iter()
            .filter(|&(_, (clicks, impressions))| {
                let ratio = if impressions == 0 {
                    0.0
                } else {
                    clicks as f64 / impressions as f64
                };
                ratio > ctr_threshold
            })
            .map(|(user_id, _)| user_id)
            .collect();
        users.sort_unstable();

        tracing::debug!(
            ad_id,
            candidates = offsets.len(),
            qualified = users.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "profit"
        );
        Ok(users)
    }

    /// Distinct ad ids a user has any record for, via a pair-index range scan
    fn ads_seen(&self, user_id: u32) -> BTreeSet<u32> {
        self.index
            .user_ad()
            .range((user_id, u32::MIN)..=(user_id, u32::MAX))
            .map(|(&(_, ad_id), _)| ad_id)
            .collect()
    }

    fn decode(&self, offset: u64) -> StoreResult<Record> {
        Record::parse(self.store.line_at(offset), self.delim)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> QueryResult<std::sync::MutexGuard<'_, T>> {
    mutex.lock().map_err(|e| QueryError::Lock(e.to_string()))
}

fn into_inner<T>(mutex: Mutex<T>) -> QueryResult<T> {
    mutex
        .into_inner()
        .map_err(|e| QueryError::Lock(e.to_string()))
}
