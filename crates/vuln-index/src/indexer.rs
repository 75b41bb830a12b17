//! Record indexing.
//!
//! This module builds the lookup structures a query runs against:
//! - `inverted` - lowercase token to record-id bitmap
//! - `categorical` - exact categorical value to record-id bitmap, per dimension
//! - `data` - `IndexData`, the immutable bundle one build produces
//!
//! Record ids are bitmap members, so intersecting search tokens and filters
//! is a bitwise AND rather than repeated set filtering.

mod categorical;
mod data;
mod inverted;

pub use categorical::{CategoricalIndex, CategoricalIndices};
pub use data::{build_record_indexes, IndexData, RecordIndexes};
pub use inverted::{tokenize, InvertedIndex};

/// How many records are indexed between progress updates.
/// Power of 2 so the check is a bitwise AND.
pub const PROGRESS_INTERVAL: usize = 0x1000; // 4,096
