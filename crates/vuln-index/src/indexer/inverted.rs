//! Inverted token index.

use fnv::FnvHashMap;
use roaring::RoaringBitmap;

use crate::ids::RecordId;
use crate::record::Record;

/// Splits already-lowercased text into tokens.
///
/// Tokens are whitespace-delimited; punctuation stays part of the token, so
/// `cve-2024-1` and `nginx:1.25` are single tokens.
#[inline]
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Maps each lowercase token to the records whose search text contains it.
///
/// No positions are kept and no stopwords are removed.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: FnvHashMap<Box<str>, RoaringBitmap>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every token of `record` under `id`.
    pub fn insert_record(&mut self, id: RecordId, record: &Record) {
        let text = record.search_text();
        for token in tokenize(&text) {
            match self.postings.get_mut(token) {
                Some(bitmap) => {
                    bitmap.insert(id.as_u32());
                }
                None => {
                    let mut bitmap = RoaringBitmap::new();
                    bitmap.insert(id.as_u32());
                    self.postings.insert(token.into(), bitmap);
                }
            }
        }
    }

    /// Returns the bucket for an exact token.
    #[inline]
    pub fn get(&self, token: &str) -> Option<&RoaringBitmap> {
        self.postings.get(token)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Approximate heap footprint: token bytes plus serialized bitmap sizes.
    pub fn estimated_bytes(&self) -> usize {
        self.postings
            .iter()
            .map(|(token, bitmap)| token.len() + bitmap.serialized_size())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(identifier: &str, description: &str) -> Record {
        Record {
            identifier: identifier.into(),
            description: description.into(),
            ..Record::default()
        }
    }

    #[test]
    fn tokenize_splits_on_any_whitespace() {
        let tokens: Vec<_> = tokenize("  heap\toverflow\n in  zlib ").collect();
        assert_eq!(tokens, ["heap", "overflow", "in", "zlib"]);
    }

    #[test]
    fn buckets_hold_only_records_containing_token() {
        let mut index = InvertedIndex::new();
        index.insert_record(RecordId::new(0), &record("CVE-1", "Heap overflow"));
        index.insert_record(RecordId::new(1), &record("CVE-2", "stack overflow"));
        index.insert_record(RecordId::new(2), &record("CVE-3", "Use after free"));

        let overflow: Vec<u32> = index.get("overflow").expect("bucket").iter().collect();
        assert_eq!(overflow, [0, 1]);
        let heap: Vec<u32> = index.get("heap").expect("bucket").iter().collect();
        assert_eq!(heap, [0]);
        assert!(index.get("Heap").is_none());
        assert!(index.get("over").is_none());
    }

    #[test]
    fn repeated_tokens_collapse_to_one_member() {
        let mut index = InvertedIndex::new();
        index.insert_record(RecordId::new(7), &record("CVE-7", "cve-7 CVE-7 again"));
        assert_eq!(index.get("cve-7").expect("bucket").len(), 1);
    }

    #[test]
    fn empty_fields_contribute_no_tokens() {
        let mut index = InvertedIndex::new();
        index.insert_record(RecordId::new(0), &Record::default());
        assert!(index.is_empty());
        assert_eq!(index.estimated_bytes(), 0);
    }
}
