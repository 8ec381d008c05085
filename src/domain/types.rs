//! Identifier newtypes shared across the collection, wire, and report layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the thread that produced a measurement.
///
/// Live collection assigns these from a process-local counter; replayed logs
/// carry whatever identifier the producing application wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thread {}", self.0)
    }
}

/// Application-defined frame counter (e.g. one render or simulation tick).
///
/// Frames bucket measurements for separate per-frame reports. Measurements
/// taken outside any frame carry `Option<FrameId>::None`, which the wire
/// format represents with the `-1` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub i32);

impl FrameId {
    /// Wire sentinel meaning "no frame".
    pub const NONE_SENTINEL: i32 = -1;

    /// Convert a wire-level frame field to the in-memory form.
    /// Any negative value means "no frame".
    #[must_use]
    pub fn from_wire(raw: i32) -> Option<FrameId> {
        (raw >= 0).then_some(FrameId(raw))
    }

    /// Convert the in-memory form back to the wire-level field.
    #[must_use]
    pub fn to_wire(frame: Option<FrameId>) -> i32 {
        frame.map_or(Self::NONE_SENTINEL, |f| f.0)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame #{}", self.0)
    }
}
