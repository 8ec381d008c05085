//! # Live instrumentation entry points
//!
//! `Profiler` is a cheaply cloneable handle shared across threads. It owns
//! the enable gate, the clock epoch, and the recorder queue. Each collecting
//! thread derives its own [`ThreadCollector`], which exclusively owns that
//! thread's `ScopeStack` — the collector is deliberately `!Send`, so no
//! cross-thread stack mutation can ever happen.
//!
//! Timed regions are expressed as scoped guards:
//!
//! ```
//! use perfscope::timing::Profiler;
//!
//! let profiler = Profiler::new();
//! let collector = profiler.thread_collector();
//! {
//!     let _outer = collector.scope("load", None);
//!     let _inner = collector.scope("parse", None);
//!     // both regions finalize and emit when the guards drop
//! }
//! let data = profiler.drain();
//! assert_eq!(data.events.len(), 2);
//! ```

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::domain::{FrameId, ThreadId};
use crate::wire::RawLogEvent;

use super::recorder::{EventRecorder, RecorderHandle};
use super::scope_stack::{Annotation, ScopeStack, UnderflowRecovery};
use super::ProfileData;

/// Process-local thread identifiers for live collection.
///
/// `std::thread::ThreadId` has no stable integer form, so each collecting
/// thread takes the next value from a shared counter on first use.
static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_THREAD_ID: ThreadId =
        ThreadId(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed));
}

fn current_thread_id() -> ThreadId {
    CURRENT_THREAD_ID.with(|id| *id)
}

#[derive(Debug)]
struct RawCapture {
    tx: Sender<RawLogEvent>,
    rx: Receiver<RawLogEvent>,
}

#[derive(Debug)]
struct Shared {
    enabled: AtomicBool,
    recorder: EventRecorder,
    epoch: Instant,
    /// Optional tap mirroring every enter/exit/note as a wire-level event.
    raw: Option<RawCapture>,
}

impl Shared {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_ns(&self, now: f64) -> u64 {
        (now * 1e9).round() as u64
    }

    fn capture(&self, event: RawLogEvent) {
        if let Some(raw) = &self.raw {
            let _ = raw.tx.send(event);
        }
    }
}

/// Shared handle to a live profiling session.
#[derive(Debug, Clone)]
pub struct Profiler {
    shared: Arc<Shared>,
}

impl Profiler {
    /// New session, enabled, measuring but not capturing raw events.
    #[must_use]
    pub fn new() -> Self {
        Self::build(false)
    }

    /// New session that additionally mirrors every enter/exit/note as a
    /// wire-level [`RawLogEvent`], ready to be encoded to a log file.
    #[must_use]
    pub fn with_raw_capture() -> Self {
        Self::build(true)
    }

    fn build(capture_raw: bool) -> Self {
        let raw = capture_raw.then(|| {
            let (tx, rx) = unbounded();
            RawCapture { tx, rx }
        });
        Self {
            shared: Arc::new(Shared {
                enabled: AtomicBool::new(true),
                recorder: EventRecorder::new(),
                epoch: Instant::now(),
                raw,
            }),
        }
    }

    /// Flip the process-wide collection gate. When disabled, every
    /// enter/exit/note is a no-op.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Relaxed)
    }

    /// Derive the calling thread's collector. Call once per thread and keep
    /// it for the thread's lifetime; each collector owns its own stack.
    #[must_use]
    pub fn thread_collector(&self) -> ThreadCollector {
        let thread_id = current_thread_id();
        ThreadCollector {
            shared: Arc::clone(&self.shared),
            handle: self.shared.recorder.handle(),
            thread_id,
            stack: RefCell::new(ScopeStack::new(thread_id, UnderflowRecovery::Immediate)),
        }
    }

    /// Record a free-text note from the calling thread.
    pub fn note(&self, text: &str, frame: Option<FrameId>) {
        if !self.is_enabled() {
            return;
        }
        let now = self.shared.now();
        let thread_id = current_thread_id();
        self.shared.capture(RawLogEvent::note(
            thread_id,
            frame,
            self.shared.now_ns(now),
            text,
        ));
        self.shared.recorder.handle().note(Annotation {
            text: text.to_string(),
            thread_id,
            frame,
            timestamp: now,
        });
    }

    /// Drain all completed measurements and annotations collected so far.
    ///
    /// Report phase: single-threaded, called after instrumentation has
    /// logically paused for this pass.
    #[must_use]
    pub fn drain(&self) -> ProfileData {
        self.shared.recorder.drain()
    }

    /// Drain the raw wire-level event stream (sessions created with
    /// [`Profiler::with_raw_capture`]; empty otherwise).
    #[must_use]
    pub fn drain_raw(&self) -> Vec<RawLogEvent> {
        self.shared
            .raw
            .as_ref()
            .map(|raw| raw.rx.try_iter().collect())
            .unwrap_or_default()
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-thread instrumentation front end. `!Send`: the stack it owns is only
/// ever touched by the thread that created it.
#[derive(Debug)]
pub struct ThreadCollector {
    shared: Arc<Shared>,
    handle: RecorderHandle,
    thread_id: ThreadId,
    stack: RefCell<ScopeStack>,
}

impl ThreadCollector {
    /// Open a timed region. The region finalizes and emits its measurement
    /// when the returned guard drops — on every exit path, including unwind.
    ///
    /// If collection is disabled at this point the guard is inert.
    #[must_use = "the region is timed until this guard is dropped"]
    pub fn scope(&self, block_name: &str, frame: Option<FrameId>) -> RegionGuard<'_> {
        if !self.shared.enabled.load(Ordering::Relaxed) {
            return RegionGuard { collector: None, frame };
        }
        let now = self.shared.now();
        self.shared.capture(RawLogEvent::enter(
            self.thread_id,
            frame,
            self.shared.now_ns(now),
            block_name,
        ));
        if let Some(bridge) = self.stack.borrow_mut().enter(block_name, frame, now) {
            self.handle.completed(bridge);
        }
        RegionGuard { collector: Some(self), frame }
    }

    /// Record a free-text note from this thread.
    pub fn note(&self, text: &str, frame: Option<FrameId>) {
        if !self.shared.enabled.load(Ordering::Relaxed) {
            return;
        }
        let now = self.shared.now();
        self.shared.capture(RawLogEvent::note(
            self.thread_id,
            frame,
            self.shared.now_ns(now),
            text,
        ));
        self.handle.note(Annotation {
            text: text.to_string(),
            thread_id: self.thread_id,
            frame,
            timestamp: now,
        });
    }

    fn finish_region(&self, frame: Option<FrameId>) {
        let now = self.shared.now();
        self.shared
            .capture(RawLogEvent::exit(self.thread_id, frame, self.shared.now_ns(now)));
        if let Some(event) = self.stack.borrow_mut().exit(frame, now) {
            self.handle.completed(event);
        }
    }
}

/// Guard for one open region. Dropping it closes the region.
#[must_use = "the region is timed until this guard is dropped"]
#[derive(Debug)]
pub struct RegionGuard<'a> {
    /// `None` when collection was disabled at entry; drop does nothing.
    collector: Option<&'a ThreadCollector>,
    frame: Option<FrameId>,
}

impl Drop for RegionGuard<'_> {
    fn drop(&mut self) {
        if let Some(collector) = self.collector {
            collector.finish_region(self.frame);
        }
    }
}
