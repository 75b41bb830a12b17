//! Core index data.
//!
//! `IndexData` holds everything one build produces:
//! 1. `InvertedIndex` - token to record ids
//! 2. `CategoricalIndices` - exact dimension value to record ids
//! 3. `SortedSequences` - precomputed total orders
//!
//! It is assembled once and never mutated; a changed dataset needs a new
//! engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::categorical::CategoricalIndices;
use super::inverted::InvertedIndex;
use super::PROGRESS_INTERVAL;
use crate::ids::RecordId;
use crate::record::Record;
use crate::sort::SortedSequences;
use crate::types::{DistinctValues, SortField};

/// Output of the indexing phase.
#[derive(Debug, Default)]
pub struct RecordIndexes {
    pub inverted: InvertedIndex,
    pub categorical: CategoricalIndices,
}

/// Indexes every record, publishing progress to `indexed` every
/// `PROGRESS_INTERVAL` records.
pub fn build_record_indexes(records: &[Record], indexed: &AtomicUsize) -> RecordIndexes {
    let mut indexes = RecordIndexes::default();
    for (position, record) in records.iter().enumerate() {
        let id = RecordId::new(position);
        indexes.inverted.insert_record(id, record);
        indexes.categorical.insert_record(id, record);
        if position & (PROGRESS_INTERVAL - 1) == 0 {
            indexed.store(position + 1, Ordering::Relaxed);
        }
    }
    indexed.store(records.len(), Ordering::Relaxed);
    indexes
}

/// Immutable, fully built index over one record array.
#[derive(Debug)]
pub struct IndexData {
    records: Arc<[Record]>,
    inverted: InvertedIndex,
    categorical: CategoricalIndices,
    sorted: SortedSequences,
    estimated_bytes: usize,
}

impl IndexData {
    /// Combines the outputs of the indexing and sort phases.
    pub fn assemble(records: Arc<[Record]>, indexes: RecordIndexes, sorted: SortedSequences) -> Self {
        let estimated_bytes = indexes.inverted.estimated_bytes()
            + indexes.categorical.estimated_bytes()
            + sorted.estimated_bytes();
        Self {
            records,
            inverted: indexes.inverted,
            categorical: indexes.categorical,
            sorted,
            estimated_bytes,
        }
    }

    /// Builds everything inline. The engine builds through the scheduler;
    /// this is for callers that already run off the critical path.
    pub fn build(records: Arc<[Record]>, sort_fields: &[SortField]) -> Self {
        let indexes = build_record_indexes(&records, &AtomicUsize::new(0));
        let sorted = SortedSequences::precompute(&records, sort_fields);
        Self::assemble(records, indexes, sorted)
    }

    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[inline]
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.get())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn inverted(&self) -> &InvertedIndex {
        &self.inverted
    }

    #[inline]
    pub fn categorical(&self) -> &CategoricalIndices {
        &self.categorical
    }

    #[inline]
    pub fn sorted(&self) -> &SortedSequences {
        &self.sorted
    }

    /// Approximate index footprint in bytes.
    pub fn estimated_bytes(&self) -> usize {
        self.estimated_bytes
    }

    pub fn distinct_values(&self) -> DistinctValues {
        self.categorical.distinct_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    fn records() -> Arc<[Record]> {
        (0..10_000)
            .map(|i| Record {
                identifier: format!("CVE-{i}"),
                severity: if i % 2 == 0 { "high" } else { "low" }.to_string(),
                ..Record::default()
            })
            .collect()
    }

    #[test]
    fn progress_reaches_record_count() {
        let records = records();
        let indexed = AtomicUsize::new(0);
        let indexes = build_record_indexes(&records, &indexed);
        assert_eq!(indexed.load(Ordering::Relaxed), records.len());
        assert_eq!(indexes.inverted.len(), records.len());
    }

    #[test]
    fn assembled_estimate_sums_parts() {
        let records = records();
        let data = IndexData::build(records.clone(), &[SortField::Identifier]);
        let expected = data.inverted().estimated_bytes()
            + data.categorical().estimated_bytes()
            + data.sorted().estimated_bytes();
        assert_eq!(data.estimated_bytes(), expected);
        assert!(data.estimated_bytes() > 0);
        assert_eq!(data.len(), records.len());
        assert_eq!(
            data.categorical()
                .get(Dimension::Severity)
                .get("high")
                .map(|bitmap| bitmap.len()),
            Some(5_000)
        );
    }

    #[test]
    fn empty_dataset_builds() {
        let data = IndexData::build(Arc::from(Vec::<Record>::new()), &SortField::ALL);
        assert!(data.is_empty());
        assert!(data.inverted().is_empty());
        assert_eq!(data.sorted().len(), SortField::ALL.len() * 2);
    }
}
