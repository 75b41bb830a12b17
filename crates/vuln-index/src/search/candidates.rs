//! Candidate selection: search term and categorical filters.

use roaring::RoaringBitmap;

use crate::ids::RecordId;
use crate::indexer::{tokenize, IndexData, InvertedIndex};
use crate::types::{Dimension, FilterMap};

/// Record ids satisfying the search term and filters so far.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidates {
    /// Every record. Kept lazy so an unfiltered query never materializes ids.
    All,
    Set(RoaringBitmap),
}

impl Candidates {
    pub fn empty() -> Self {
        Self::Set(RoaringBitmap::new())
    }

    /// Number of candidates in a dataset of `total` records.
    pub fn len(&self, total: usize) -> usize {
        match self {
            Self::All => total,
            Self::Set(set) => set.len() as usize,
        }
    }

    /// True when no record can match. `All` over an empty dataset is not
    /// reported here; the page logic handles it through `len`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Set(set) if set.is_empty())
    }

    #[inline]
    pub fn contains(&self, id: RecordId) -> bool {
        match self {
            Self::All => true,
            Self::Set(set) => set.contains(id.as_u32()),
        }
    }

    /// Narrows to the members of `bucket`.
    pub fn intersect(self, bucket: &RoaringBitmap) -> Self {
        match self {
            Self::All => Self::Set(bucket.clone()),
            Self::Set(mut set) => {
                set &= bucket;
                Self::Set(set)
            }
        }
    }

    /// Candidate ids in ingestion order.
    pub fn ids(&self, total: usize) -> Vec<RecordId> {
        match self {
            Self::All => (0..total).map(RecordId::new).collect(),
            Self::Set(set) => set.iter().map(RecordId::from_u32).collect(),
        }
    }
}

/// Selects candidates for a search term.
///
/// 1. A term that is empty after trimming selects every record.
/// 2. If the whole lowercased term is an indexed token, its bucket is used.
/// 3. Otherwise the term is split on whitespace and the token buckets are
///    intersected. Any token missing from the index empties the result;
///    there is no prefix or substring fallback.
///
/// Tokens never contain whitespace, so step 2 can only hit for single-word
/// terms; multi-word terms always go through step 3.
pub fn term_candidates(index: &InvertedIndex, term: &str) -> Candidates {
    let lowered = term.to_lowercase();
    if lowered.trim().is_empty() {
        return Candidates::All;
    }

    if let Some(bucket) = index.get(&lowered) {
        return Candidates::Set(bucket.clone());
    }

    let mut candidates = Candidates::All;
    for token in tokenize(&lowered) {
        let Some(bucket) = index.get(token) else {
            return Candidates::empty();
        };
        candidates = candidates.intersect(bucket);
        if candidates.is_empty() {
            break;
        }
    }
    candidates
}

/// Intersects `candidates` with every active filter.
///
/// Filters with an empty value are inactive, unknown dimension names are
/// ignored, and an unknown value empties the result.
pub fn apply_filters(data: &IndexData, mut candidates: Candidates, filters: &FilterMap) -> Candidates {
    for (name, value) in filters {
        if value.is_empty() {
            continue;
        }
        let Some(dimension) = Dimension::parse(name) else {
            log::debug!("ignoring unknown filter dimension={name}");
            continue;
        };
        let Some(bucket) = data.categorical().get(dimension).get(value) else {
            return Candidates::empty();
        };
        candidates = candidates.intersect(bucket);
        if candidates.is_empty() {
            break;
        }
    }
    candidates
}
