//! Deferred index construction.
//!
//! Construction only validates input and schedules one build task on the
//! current tokio runtime. The task builds the record indexes, yields once,
//! precomputes the sort orders and then publishes the finished `IndexData`
//! through a one-shot readiness channel owned by the engine instance.
//!
//! - `state` - build state and progress tracking
//! - `task` - the build task, idle signal and readiness handle

mod state;
mod task;

pub use state::{unix_now_millis, BuildProgress, BuildState, ProgressSnapshot};
pub use task::{BuildHandle, IdleSignal};
