//! In-memory indexed search over vulnerability findings.
//!
//! This crate provides:
//! - Lenient JSON ingestion into normalized records
//! - Inverted and categorical indexes backed by roaring bitmaps
//! - Precomputed sort orders with on-demand fallback
//! - A deferred index build with an explicit readiness handle
//! - A query engine with filter/sort fusion and pagination
//! - A TTL/version snapshot cache for hosts

pub mod cache;
pub mod config;
pub mod error;
pub mod ids;
pub mod indexer;
pub mod record;
pub mod scheduler;
pub mod search;
pub mod sort;
pub mod types;

// Re-export main types
pub use cache::{Snapshot, SnapshotCache, SnapshotInfo, SnapshotStats};
pub use config::{BuildConfig, BuildTrigger, CacheConfig, EngineConfig};
pub use error::{ConstructionError, EngineError, Result};
pub use ids::RecordId;
pub use indexer::IndexData;
pub use record::Record;
pub use scheduler::{BuildState, IdleSignal};
pub use search::{execute_query, QueryEngine};
pub use types::{
    BuildStatus, Dimension, DistinctValues, FilterMap, QueryResult, QueryStats, SearchQuery,
    SortDirection, SortField, SortKey,
};
