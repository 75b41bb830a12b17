//! Host-side cache of built engines.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use serde::Serialize;

use crate::config::CacheConfig;
use crate::record::Record;
use crate::search::QueryEngine;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub records: usize,
    /// Index footprint estimate, 0 when the engine had not finished building.
    pub estimated_memory_bytes: usize,
}

/// Serializable build metadata of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub stats: SnapshotStats,
    pub built_at: DateTime<Utc>,
    pub version: String,
}

/// A built engine together with its source records and build metadata.
#[derive(Debug)]
pub struct Snapshot {
    pub records: Arc<[Record]>,
    pub engine: Arc<QueryEngine>,
    pub stats: SnapshotStats,
    pub built_at: DateTime<Utc>,
    pub version: String,
}

impl Snapshot {
    pub fn new(engine: Arc<QueryEngine>, version: impl Into<String>) -> Self {
        let stats = SnapshotStats {
            records: engine.len(),
            estimated_memory_bytes: engine
                .index()
                .map_or(0, |index| index.estimated_bytes()),
        };
        Self {
            records: engine.records().clone(),
            engine,
            stats,
            built_at: Utc::now(),
            version: version.into(),
        }
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            stats: self.stats.clone(),
            built_at: self.built_at,
            version: self.version.clone(),
        }
    }
}

/// TTL- and capacity-bounded snapshot cache keyed by dataset name.
///
/// Entries tagged with a version other than the cache's are dropped on read.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    cache: Cache<String, Arc<Snapshot>>,
    version: String,
}

impl SnapshotCache {
    pub fn new(config: &CacheConfig) -> Self {
        let max_capacity = config.max_entries.max(1);
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();
        Self {
            cache,
            version: config.version.clone(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, key: &str) -> Option<Arc<Snapshot>> {
        let snapshot = self.cache.get(key)?;
        if snapshot.version != self.version {
            log::debug!(
                "dropping stale snapshot key={} version={} expected={}",
                key,
                snapshot.version,
                self.version
            );
            self.cache.invalidate(key);
            return None;
        }
        Some(snapshot)
    }

    pub fn put(&self, key: &str, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.cache.insert(key.to_string(), snapshot.clone());
        snapshot
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
