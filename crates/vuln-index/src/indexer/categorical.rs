//! Exact-value categorical indices.

use std::collections::BTreeMap;

use roaring::RoaringBitmap;

use crate::ids::RecordId;
use crate::record::Record;
use crate::sort::TextCollator;
use crate::types::{Dimension, DistinctValues};

/// Maps exact (case-preserved) values of one dimension to record ids.
///
/// Uses `BTreeMap` for deterministic iteration order.
#[derive(Debug, Default, Clone)]
pub struct CategoricalIndex {
    buckets: BTreeMap<Box<str>, RoaringBitmap>,
}

impl CategoricalIndex {
    pub fn insert(&mut self, id: RecordId, value: &str) {
        match self.buckets.get_mut(value) {
            Some(bitmap) => {
                bitmap.insert(id.as_u32());
            }
            None => {
                let mut bitmap = RoaringBitmap::new();
                bitmap.insert(id.as_u32());
                self.buckets.insert(value.into(), bitmap);
            }
        }
    }

    /// Returns the bucket for an exact value. No case folding.
    #[inline]
    pub fn get(&self, value: &str) -> Option<&RoaringBitmap> {
        self.buckets.get(value)
    }

    /// Number of distinct values, including the empty value.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RoaringBitmap)> {
        self.buckets.iter().map(|(value, bitmap)| (&**value, bitmap))
    }

    pub fn estimated_bytes(&self) -> usize {
        self.buckets
            .iter()
            .map(|(value, bitmap)| value.len() + bitmap.serialized_size())
            .sum()
    }
}

/// One [`CategoricalIndex`] per [`Dimension`].
#[derive(Debug, Default, Clone)]
pub struct CategoricalIndices {
    indices: [CategoricalIndex; 4],
}

impl CategoricalIndices {
    /// Adds `record` to the bucket of its own value in every dimension.
    pub fn insert_record(&mut self, id: RecordId, record: &Record) {
        for dimension in Dimension::ALL {
            self.indices[dimension.slot()].insert(id, dimension.value_of(record));
        }
    }

    #[inline]
    pub fn get(&self, dimension: Dimension) -> &CategoricalIndex {
        &self.indices[dimension.slot()]
    }

    /// Distinct non-empty values per dimension, in collation order.
    pub fn distinct_values(&self) -> DistinctValues {
        let mut collator = TextCollator::new();
        Dimension::ALL
            .into_iter()
            .map(|dimension| {
                let mut values: Vec<String> = self
                    .get(dimension)
                    .iter()
                    .map(|(value, _)| value)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .collect();
                values.sort_by(|a, b| collator.compare(a, b));
                (dimension, values)
            })
            .collect()
    }

    pub fn estimated_bytes(&self) -> usize {
        self.indices.iter().map(CategoricalIndex::estimated_bytes).sum()
    }
}
