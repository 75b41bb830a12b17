//! The build task and its readiness handle.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};

use super::state::{unix_now_millis, BuildProgress, BuildState};
use crate::config::{BuildConfig, BuildTrigger, EngineConfig};
use crate::error::{ConstructionError, EngineError, Result};
use crate::indexer::{build_record_indexes, IndexData};
use crate::record::Record;
use crate::sort::SortedSequences;
use crate::types::{BuildStatus, SortField};

type Readiness = Option<Arc<IndexData>>;

/// Host-side "spare capacity" notification for idle-triggered builds.
///
/// A notification sent before the build task starts waiting is kept, so the
/// host may signal at any time after construction.
#[derive(Debug, Clone, Default)]
pub struct IdleSignal {
    notify: Arc<Notify>,
}

impl IdleSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify_idle(&self) {
        self.notify.notify_one();
    }
}

/// State shared between the engine and its build task.
#[derive(Debug)]
struct BuildShared {
    records: usize,
    state: AtomicU8,
    progress: BuildProgress,
    last_error: Mutex<Option<String>>,
}

impl BuildShared {
    fn new(records: usize) -> Self {
        Self {
            records,
            state: AtomicU8::new(BuildState::Scheduled as u8),
            progress: BuildProgress::new_scheduled(unix_now_millis()),
            last_error: Mutex::new(None),
        }
    }
}

/// Owned handle to one engine's build: status plus the readiness signal.
#[derive(Debug)]
pub struct BuildHandle {
    shared: Arc<BuildShared>,
    ready: watch::Receiver<Readiness>,
    idle: IdleSignal,
}

impl BuildHandle {
    /// Spawns the build task on the current runtime and returns at once.
    pub fn schedule(
        records: Arc<[Record]>,
        config: &EngineConfig,
    ) -> std::result::Result<Self, ConstructionError> {
        let runtime = Handle::try_current().map_err(|_| ConstructionError::NoRuntime)?;

        let shared = Arc::new(BuildShared::new(records.len()));
        let idle = IdleSignal::new();
        let (sender, ready) = watch::channel(None);

        log::info!(
            "vuln index build scheduled records={} trigger={:?}",
            records.len(),
            config.build.trigger,
        );

        runtime.spawn(run_build(
            records,
            config.precomputed_sorts.clone(),
            config.build.clone(),
            shared.clone(),
            idle.clone(),
            sender,
        ));

        Ok(Self {
            shared,
            ready,
            idle,
        })
    }

    /// Returns the finished index without waiting.
    pub fn try_ready(&self) -> Option<Arc<IndexData>> {
        self.ready.borrow().clone()
    }

    /// Waits for the build to publish its index.
    ///
    /// Returns at once when the build already finished. Fails only when the
    /// build task ended without publishing.
    pub async fn wait_ready(&self) -> Result<Arc<IndexData>> {
        let mut ready = self.ready.clone();
        let published = ready
            .wait_for(Option::is_some)
            .await
            .map_err(|_| self.aborted())?;
        (*published).clone().ok_or_else(|| self.aborted())
    }

    pub fn idle_signal(&self) -> IdleSignal {
        self.idle.clone()
    }

    /// A published index always reports `Ready`, whatever the task has
    /// stored so far.
    pub fn state(&self) -> BuildState {
        if self.ready.borrow().is_some() {
            return BuildState::Ready;
        }
        BuildState::load(&self.shared.state)
    }

    pub fn status(&self) -> BuildStatus {
        let progress = self.shared.progress.snapshot();
        BuildStatus {
            state: self.state().as_str().to_string(),
            records: self.shared.records,
            indexed_records: progress.indexed_records,
            scheduled_at: progress.scheduled_at,
            started_at: progress.started_at,
            finished_at: progress.finished_at,
            build_ms: progress
                .started_at
                .zip(progress.finished_at)
                .map(|(started, finished)| finished.saturating_sub(started)),
            last_error: self.shared.last_error.lock().clone(),
        }
    }

    fn aborted(&self) -> EngineError {
        let reason = self
            .shared
            .last_error
            .lock()
            .clone()
            .unwrap_or_else(|| "build task ended before the index was ready".to_string());
        EngineError::BuildAborted(reason)
    }
}

async fn run_build(
    records: Arc<[Record]>,
    sort_fields: Vec<SortField>,
    build: BuildConfig,
    shared: Arc<BuildShared>,
    idle: IdleSignal,
    ready: watch::Sender<Readiness>,
) {
    match build.trigger {
        BuildTrigger::Deferred => tokio::task::yield_now().await,
        BuildTrigger::Idle => {
            let idle_wait = idle.notify.notified();
            if tokio::time::timeout(build.idle_fallback(), idle_wait)
                .await
                .is_err()
            {
                log::debug!(
                    "vuln index idle signal not received within {}ms, building anyway",
                    build.idle_fallback_ms
                );
            }
        }
    }

    let build_started = Instant::now();
    BuildState::Building.store(&shared.state);
    shared
        .progress
        .started_at
        .store(unix_now_millis(), Ordering::Relaxed);

    let Some(indexes) = run_phase(&shared, "index", || {
        build_record_indexes(&records, &shared.progress.indexed_records)
    }) else {
        return;
    };
    let index_ms = build_started.elapsed().as_millis();

    // Let other tasks run between the two phases.
    tokio::task::yield_now().await;

    let sort_started = Instant::now();
    let Some(sorted) = run_phase(&shared, "sort", || {
        SortedSequences::precompute(&records, &sort_fields)
    }) else {
        return;
    };
    let sort_ms = sort_started.elapsed().as_millis();

    let data = Arc::new(IndexData::assemble(records, indexes, sorted));
    shared
        .progress
        .finished_at
        .store(unix_now_millis(), Ordering::Relaxed);

    log::info!(
        "vuln index build finished records={} tokens={} sorted_sequences={} estimated_bytes={} index_ms={} sort_ms={}",
        data.len(),
        data.inverted().len(),
        data.sorted().len(),
        data.estimated_bytes(),
        index_ms,
        sort_ms,
    );

    BuildState::Ready.store(&shared.state);
    ready.send_replace(Some(data));
}

/// Runs one build phase, converting a panic into the `Error` state.
fn run_phase<T>(shared: &BuildShared, phase: &str, work: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(work)) {
        Ok(output) => Some(output),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "build task panicked".to_string()
            };
            log::warn!("vuln index {phase} phase panicked: {panic_msg}");
            *shared.last_error.lock() = Some(format!("panic during {phase} phase: {panic_msg}"));
            shared
                .progress
                .finished_at
                .store(unix_now_millis(), Ordering::Relaxed);
            BuildState::Error.store(&shared.state);
            None
        }
    }
}
