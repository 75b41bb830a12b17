//! Precomputed sort orders.

use std::collections::BTreeMap;

use crate::ids::RecordId;
use crate::record::Record;
use crate::types::{SortDirection, SortField, SortKey};

use super::compare::{sort_ids_with, TextCollator};

/// Full permutations of all record ids, one per precomputed `(field, direction)`.
///
/// Uses `BTreeMap` for deterministic iteration order.
#[derive(Debug, Default, Clone)]
pub struct SortedSequences {
    sequences: BTreeMap<SortKey, Box<[RecordId]>>,
}

impl SortedSequences {
    /// Computes both directions for every field in `fields`.
    pub fn precompute(records: &[Record], fields: &[SortField]) -> Self {
        let all: Vec<RecordId> = (0..records.len()).map(RecordId::new).collect();
        let mut collator = TextCollator::new();
        let mut sequences = BTreeMap::new();
        for &field in fields {
            for direction in SortDirection::BOTH {
                let key = SortKey::new(field, direction);
                if sequences.contains_key(&key) {
                    continue;
                }
                let mut ids = all.clone();
                sort_ids_with(&mut collator, records, &mut ids, key);
                sequences.insert(key, ids.into_boxed_slice());
            }
        }
        Self { sequences }
    }

    #[inline]
    pub fn get(&self, key: SortKey) -> Option<&[RecordId]> {
        self.sequences.get(&key).map(|ids| &**ids)
    }

    pub fn keys(&self) -> impl Iterator<Item = SortKey> + '_ {
        self.sequences.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Four bytes per stored id.
    pub fn estimated_bytes(&self) -> usize {
        self.sequences
            .values()
            .map(|ids| ids.len() * std::mem::size_of::<RecordId>())
            .sum()
    }
}
