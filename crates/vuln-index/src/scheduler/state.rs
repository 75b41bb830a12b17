//! Build state and progress tracking.

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Index build state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum BuildState {
    Scheduled = 0,
    Building = 1,
    Ready = 2,
    Error = 3,
}

impl BuildState {
    /// Loads the state from an atomic.
    pub fn load(atomic: &AtomicU8) -> Self {
        match atomic.load(Ordering::Acquire) {
            1 => Self::Building,
            2 => Self::Ready,
            3 => Self::Error,
            _ => Self::Scheduled,
        }
    }

    pub fn store(self, atomic: &AtomicU8) {
        atomic.store(self as u8, Ordering::Release);
    }

    /// Returns the state as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Building => "building",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

/// Progress tracking for one build. Timestamps are Unix milliseconds, `0`
/// meaning "not yet".
#[derive(Debug, Default)]
pub struct BuildProgress {
    pub indexed_records: AtomicUsize,
    pub scheduled_at: AtomicU64,
    pub started_at: AtomicU64,
    pub finished_at: AtomicU64,
}

impl BuildProgress {
    pub fn new_scheduled(scheduled_at: u64) -> Self {
        Self {
            scheduled_at: AtomicU64::new(scheduled_at),
            ..Self::default()
        }
    }

    /// Takes a snapshot of the progress values.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            indexed_records: self.indexed_records.load(Ordering::Relaxed),
            scheduled_at: zero_to_none(self.scheduled_at.load(Ordering::Relaxed)),
            started_at: zero_to_none(self.started_at.load(Ordering::Relaxed)),
            finished_at: zero_to_none(self.finished_at.load(Ordering::Relaxed)),
        }
    }
}

/// A snapshot of build progress values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub indexed_records: usize,
    pub scheduled_at: Option<u64>,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
}

/// Returns the current Unix timestamp in milliseconds.
pub fn unix_now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or(0)
}

fn zero_to_none(value: u64) -> Option<u64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}
