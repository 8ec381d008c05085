//! # Per-thread call-stack timing
//!
//! A `ScopeStack` tracks the regions currently open on one thread and turns
//! each region exit into a finished measurement with two durations:
//!
//! - **inclusive**: total wall time the region was open
//! - **exclusive**: wall time spent in the region itself, excluding nested
//!   child regions
//!
//! The exclusive clock is handed back and forth at every nesting boundary:
//! entering a child charges the elapsed slice to the parent and exiting the
//! child restarts the parent's slice. A parent's exclusive duration therefore
//! equals its inclusive duration minus the sum of its direct children's
//! inclusive durations.
//!
//! Each stack is owned by exactly one thread (live) or one replay pass, so
//! no locking is involved.

use crate::domain::{FrameId, ThreadId};
use std::collections::HashMap;

/// Name given to synthesized regions that bridge time where the matching
/// enter was never observed.
pub const UNKNOWN_SCOPE: &str = "<unknown>";

/// How a stack recovers when an exit arrives with no region on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderflowRecovery {
    /// Synthesize a bridging `<unknown>` measurement immediately, spanning
    /// from the last known boundary for that frame to the exit timestamp.
    /// Used by live collection so no time is silently lost.
    Immediate,
    /// Remember the exit timestamp and bridge when the next enter arrives
    /// for the same frame. Used by replay, where a log may start mid-region.
    Deferred,
}

/// One in-flight timed region. Lives only while on its stack.
#[derive(Debug)]
struct ActiveRegion {
    scope_name: String,
    frame: Option<FrameId>,
    inclusive_start: f64,
    /// Start of the current exclusive slice. Stale while a child region is
    /// open; reset when the child exits.
    exclusive_start: f64,
    exclusive_accum: f64,
}

/// A finished measurement for one region. Emitted exactly once, on exit.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedEvent {
    /// Hierarchical identifier: enclosing block names joined with `::`.
    pub scope_name: String,
    /// Total wall time the region was open, in seconds.
    pub inclusive: f64,
    /// Wall time attributed to the region itself, in seconds.
    pub exclusive: f64,
    pub thread_id: ThreadId,
    pub frame: Option<FrameId>,
    pub start: f64,
    pub end: f64,
}

/// Free-text, timestamped note not tied to a specific region.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub thread_id: ThreadId,
    pub frame: Option<FrameId>,
    /// Seconds. Absolute at collection time; report assembly rebases it
    /// relative to the frame start.
    pub timestamp: f64,
}

/// Stack of in-flight regions for a single thread.
#[derive(Debug)]
pub struct ScopeStack {
    thread_id: ThreadId,
    recovery: UnderflowRecovery,
    stack: Vec<ActiveRegion>,
    /// End timestamp of the last region that closed at the top level, per
    /// frame. Start point for `Immediate` bridging.
    last_end: HashMap<Option<FrameId>, f64>,
    /// Unmatched exit timestamps waiting for the next enter (`Deferred`).
    pending: HashMap<Option<FrameId>, f64>,
}

impl ScopeStack {
    #[must_use]
    pub fn new(thread_id: ThreadId, recovery: UnderflowRecovery) -> Self {
        Self {
            thread_id,
            recovery,
            stack: Vec::new(),
            last_end: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Number of regions currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Open a new region at `now` (seconds).
    ///
    /// Charges the elapsed exclusive slice to the enclosing region, if any,
    /// and derives the new region's scope name from it. Returns a bridging
    /// `<unknown>` measurement when a deferred unmatched exit was waiting
    /// for this frame.
    pub fn enter(
        &mut self,
        block_name: &str,
        frame: Option<FrameId>,
        now: f64,
    ) -> Option<CompletedEvent> {
        let mut bridge = None;
        if self.stack.is_empty() {
            if let Some(boundary) = self.pending.remove(&frame) {
                bridge = Some(self.unknown_event(frame, boundary, now));
            }
        }

        let scope_name = match self.stack.last_mut() {
            Some(parent) => {
                parent.exclusive_accum += now - parent.exclusive_start;
                format!("{}::{}", parent.scope_name, block_name)
            }
            None => block_name.to_string(),
        };

        self.stack.push(ActiveRegion {
            scope_name,
            frame,
            inclusive_start: now,
            exclusive_start: now,
            exclusive_accum: 0.0,
        });

        bridge
    }

    /// Close the top region at `now` (seconds) and finalize its measurement.
    ///
    /// The enclosing region's exclusive slice restarts at `now`, so child
    /// time is never double-counted. `frame` is consulted only when the
    /// stack is empty (unmatched exit recovery).
    pub fn exit(&mut self, frame: Option<FrameId>, now: f64) -> Option<CompletedEvent> {
        let Some(mut region) = self.stack.pop() else {
            return self.recover_underflow(frame, now);
        };

        region.exclusive_accum += now - region.exclusive_start;
        let inclusive = now - region.inclusive_start;

        if let Some(parent) = self.stack.last_mut() {
            parent.exclusive_start = now;
        } else {
            self.last_end.insert(region.frame, now);
        }

        Some(CompletedEvent {
            scope_name: region.scope_name,
            inclusive,
            exclusive: region.exclusive_accum,
            thread_id: self.thread_id,
            frame: region.frame,
            start: region.inclusive_start,
            end: now,
        })
    }

    fn recover_underflow(&mut self, frame: Option<FrameId>, now: f64) -> Option<CompletedEvent> {
        match self.recovery {
            UnderflowRecovery::Immediate => {
                let start = self.last_end.get(&frame).copied().unwrap_or(now);
                self.last_end.insert(frame, now);
                Some(self.unknown_event(frame, start, now))
            }
            UnderflowRecovery::Deferred => {
                self.pending.insert(frame, now);
                None
            }
        }
    }

    fn unknown_event(&self, frame: Option<FrameId>, start: f64, end: f64) -> CompletedEvent {
        let duration = end - start;
        CompletedEvent {
            scope_name: UNKNOWN_SCOPE.to_string(),
            inclusive: duration,
            exclusive: duration,
            thread_id: self.thread_id,
            frame,
            start,
            end,
        }
    }
}
