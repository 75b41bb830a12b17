//! Record id type.

use serde::{Deserialize, Serialize};

/// A compact 32-bit record id: the record's position in the ingested array.
///
/// Ids are only meaningful for the engine instance that produced them. Using
/// `u32` matches the bitmap id space, which caps a dataset at `u32::MAX`
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct RecordId(u32);

impl RecordId {
    /// Largest number of records an engine can hold.
    pub const MAX_RECORDS: usize = u32::MAX as usize;

    /// Creates a record id from an array position.
    ///
    /// # Panics
    /// Panics if `position >= u32::MAX`. Construction rejects such datasets
    /// before any id is created.
    #[inline]
    pub fn new(position: usize) -> Self {
        assert!(
            position < Self::MAX_RECORDS,
            "record position must be less than u32::MAX"
        );
        Self(position as u32)
    }

    /// Wraps a raw bitmap member.
    #[inline]
    pub fn from_u32(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the id as an array position.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw value stored in bitmaps.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}
