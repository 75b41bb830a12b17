//! Engine and cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::SortField;

/// When the deferred index build runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTrigger {
    /// At the next scheduling opportunity after construction.
    #[default]
    Deferred,
    /// When the host signals spare capacity, or after the idle fallback delay.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub trigger: BuildTrigger,
    /// Upper bound on how long an idle-triggered build waits for the host.
    pub idle_fallback_ms: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            trigger: BuildTrigger::Deferred,
            idle_fallback_ms: 200,
        }
    }
}

impl BuildConfig {
    pub fn idle_fallback(&self) -> Duration {
        Duration::from_millis(self.idle_fallback_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub build: BuildConfig,
    /// Fields that get precomputed orders in both directions. Other fields
    /// are sorted on demand.
    pub precomputed_sorts: Vec<SortField>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            precomputed_sorts: SortField::PRECOMPUTED_DEFAULT.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: u64,
    /// Snapshots tagged with any other version are treated as misses.
    pub version: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 600,
            max_entries: 4,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
