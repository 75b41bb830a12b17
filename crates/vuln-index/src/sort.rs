//! Record ordering.
//!
//! - `compare` - the comparison rules for every sortable field
//! - `precompute` - full per-`(field, direction)` orders built once per engine

pub mod compare;
mod precompute;

pub use compare::{parse_timestamp, severity_rank, sort_ids, sort_ids_with, TextCollator};
pub use precompute::SortedSequences;
