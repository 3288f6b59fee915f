//! Provenance-aware reconciliation of extracted batches with the store

use super::traits::{DealStore, StorageResult};
use crate::model::{DealRecord, Provenance};
use std::collections::HashMap;
use std::fmt;

/// What a merge did to the stored collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// New links appended
    pub inserted: usize,

    /// Existing records overwritten by a detail observation
    pub replaced: usize,

    /// Existing records whose volatile fields changed
    pub refreshed: usize,

    /// Candidates that left their stored record as it was
    pub unchanged: usize,
}

impl MergeStats {
    /// True if the stored collection differs from before the merge
    pub fn changed(&self) -> bool {
        self.inserted + self.replaced + self.refreshed > 0
    }
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} replaced, {} refreshed, {} unchanged",
            self.inserted, self.replaced, self.refreshed, self.unchanged
        )
    }
}

/// Applies `batch` to `existing` in memory
///
/// Per candidate, keyed by link:
/// - unknown link: appended, in batch order
/// - known link, detail provenance: the whole record is replaced
/// - known link, listing provenance: only `temperature` and `comments_count`
///   are updated
///
/// Stored records missing from the batch are kept as they are, in their
/// original order. A batch repeating a link is applied in order, so the last
/// occurrence wins.
pub fn merge(
    existing: Vec<DealRecord>,
    batch: &[DealRecord],
    provenance: Provenance,
) -> (Vec<DealRecord>, MergeStats) {
    let mut records = existing;
    let mut index: HashMap<String, usize> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (record.link.clone(), i))
        .collect();
    let mut stats = MergeStats::default();

    for candidate in batch {
        match index.get(&candidate.link).copied() {
            None => {
                index.insert(candidate.link.clone(), records.len());
                records.push(candidate.clone());
                stats.inserted += 1;
            }
            Some(i) if provenance.is_authoritative() => {
                if records[i] == *candidate {
                    stats.unchanged += 1;
                } else {
                    records[i] = candidate.clone();
                    stats.replaced += 1;
                }
            }
            Some(i) => {
                if records[i].refresh_volatile(candidate) {
                    stats.refreshed += 1;
                } else {
                    stats.unchanged += 1;
                }
            }
        }
    }

    (records, stats)
}

/// Loads the store, merges `batch` and writes the result back in one write
///
/// The write is skipped when the merge changed nothing.
pub fn merge_into_store(
    store: &mut dyn DealStore,
    batch: &[DealRecord],
    provenance: Provenance,
) -> StorageResult<MergeStats> {
    let existing = store.load_all()?;
    let (merged, stats) = merge(existing, batch, provenance);

    if stats.changed() {
        store.replace_all(&merged)?;
    }

    Ok(stats)
}
