//! Per-thread timing model and live collection
//!
//! This module contains the measurement side of the pipeline:
//! - `scope_stack`: the per-thread call-stack model that splits wall time
//!   into inclusive and exclusive durations
//! - `recorder`: the multi-producer queue completed measurements land on
//! - `profiler`: the live instrumentation entry points (enable gate, scoped
//!   region guards, annotations)

pub mod profiler;
pub mod recorder;
pub mod scope_stack;

pub use profiler::{Profiler, RegionGuard, ThreadCollector};
pub use recorder::{EventRecorder, Record, RecorderHandle};
pub use scope_stack::{Annotation, CompletedEvent, ScopeStack, UnderflowRecovery, UNKNOWN_SCOPE};

/// Everything one report pass consumes: the completed measurements plus the
/// free-text annotations collected alongside them.
#[derive(Debug, Default, Clone)]
pub struct ProfileData {
    pub events: Vec<CompletedEvent>,
    pub annotations: Vec<Annotation>,
}

impl ProfileData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.annotations.is_empty()
    }
}
