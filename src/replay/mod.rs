//! # Replay engine
//!
//! Reconstructs the per-thread timing model from a persisted event stream,
//! producing the same completed measurements the live path would have
//! emitted. One `ScopeStack` per thread id, looked up on every event; the
//! stream may interleave threads and frames freely as long as each source
//! thread's events are in order.
//!
//! Partial streams are tolerated: an exit with no prior enter records a
//! pending boundary, and the next enter for that thread+frame emits a
//! bridging `<unknown>` measurement (see
//! [`UnderflowRecovery::Deferred`](crate::timing::UnderflowRecovery)). A
//! region whose exit never appears simply emits nothing.

use std::collections::HashMap;

use log::debug;

use crate::domain::{FormatError, ThreadId};
use crate::timing::{Annotation, ProfileData, ScopeStack, UnderflowRecovery};
use crate::wire::{self, Op, RawLogEvent};

/// Names from the wire may themselves contain the scope separator (e.g.
/// C++-qualified names); fold it away so the ancestor chain still splits
/// unambiguously on `::`. Applied to every record's name field, note text
/// included.
fn sanitize_name(name: &str) -> String {
    name.replace("::", ".")
}

/// Replay an already-decoded event stream.
#[must_use]
pub fn replay(events: &[RawLogEvent]) -> ProfileData {
    let mut stacks: HashMap<ThreadId, ScopeStack> = HashMap::new();
    let mut data = ProfileData::default();

    for event in events {
        let now = event.timestamp_seconds();
        match event.op {
            Op::Enter => {
                let stack = stacks
                    .entry(event.thread_id)
                    .or_insert_with(|| ScopeStack::new(event.thread_id, UnderflowRecovery::Deferred));
                let name = sanitize_name(&event.name);
                if let Some(bridge) = stack.enter(&name, event.frame, now) {
                    data.events.push(bridge);
                }
            }
            Op::Exit => {
                let stack = stacks
                    .entry(event.thread_id)
                    .or_insert_with(|| ScopeStack::new(event.thread_id, UnderflowRecovery::Deferred));
                if let Some(completed) = stack.exit(event.frame, now) {
                    data.events.push(completed);
                }
            }
            Op::Note => data.annotations.push(Annotation {
                text: sanitize_name(&event.name),
                thread_id: event.thread_id,
                frame: event.frame,
                timestamp: now,
            }),
        }
    }

    let open: usize = stacks.values().map(ScopeStack::depth).sum();
    if open > 0 {
        debug!("{open} region(s) still open at end of stream; their measurements are dropped");
    }

    data
}

/// Decode a persisted log and replay it in one step.
pub fn from_bytes(bytes: &[u8]) -> Result<ProfileData, FormatError> {
    let events = wire::decode(bytes)?;
    debug!("decoded {} wire events", events.len());
    Ok(replay(&events))
}
