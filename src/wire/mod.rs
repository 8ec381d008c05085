//! # Event log wire format
//!
//! Two interchangeable encodings of the same semantic stream of
//! enter/exit/note events:
//!
//! - [`binary`]: compact little-endian records behind a 4-byte magic constant
//! - [`json`]: an ordered JSON array of 5-field records with identical
//!   field semantics
//!
//! [`decode`] checks the magic constant first and falls back to the
//! structured-text form on mismatch. Decoding is all-or-nothing: a malformed
//! or truncated record fails the whole decode with no partial results.

pub mod binary;
pub mod json;

use crate::domain::{FormatError, FrameId, ThreadId};

/// Nanoseconds per second, for converting wire timestamps to the in-memory
/// seconds used by the timing model.
pub const NANOS_PER_SECOND: f64 = 1e9;

/// Operation carried by one wire record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Enter,
    Exit,
    Note,
}

impl Op {
    /// Integer tag used by both encodings.
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Op::Enter => 0,
            Op::Exit => 1,
            Op::Note => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, FormatError> {
        match tag {
            0 => Ok(Op::Enter),
            1 => Ok(Op::Exit),
            2 => Ok(Op::Note),
            other => Err(FormatError::UnknownOperation(other)),
        }
    }
}

/// One wire-level timing event.
///
/// Timestamps are unsigned nanoseconds; names are ASCII. Exit records carry
/// an empty name.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLogEvent {
    pub op: Op,
    pub thread_id: ThreadId,
    pub frame: Option<FrameId>,
    pub timestamp_ns: u64,
    pub name: String,
}

impl RawLogEvent {
    #[must_use]
    pub fn enter(
        thread_id: ThreadId,
        frame: Option<FrameId>,
        timestamp_ns: u64,
        name: &str,
    ) -> Self {
        Self { op: Op::Enter, thread_id, frame, timestamp_ns, name: name.to_string() }
    }

    #[must_use]
    pub fn exit(thread_id: ThreadId, frame: Option<FrameId>, timestamp_ns: u64) -> Self {
        Self { op: Op::Exit, thread_id, frame, timestamp_ns, name: String::new() }
    }

    #[must_use]
    pub fn note(
        thread_id: ThreadId,
        frame: Option<FrameId>,
        timestamp_ns: u64,
        text: &str,
    ) -> Self {
        Self { op: Op::Note, thread_id, frame, timestamp_ns, name: text.to_string() }
    }

    /// Wire timestamp converted to the seconds used by the timing model.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn timestamp_seconds(&self) -> f64 {
        self.timestamp_ns as f64 / NANOS_PER_SECOND
    }
}

/// Decode a persisted event log.
///
/// Binary when the magic constant matches, otherwise the byte stream is
/// decoded as structured text.
pub fn decode(bytes: &[u8]) -> Result<Vec<RawLogEvent>, FormatError> {
    if binary::has_magic(bytes) {
        binary::decode(bytes)
    } else {
        json::decode(bytes)
    }
}

fn validate_name(name: &str) -> Result<(), FormatError> {
    if !name.is_ascii() {
        return Err(FormatError::NameNotAscii);
    }
    if name.len() > usize::from(u16::MAX) {
        return Err(FormatError::NameTooLong(name.len()));
    }
    Ok(())
}

/// Name actually written for a record: exits always persist an empty name.
fn wire_name(event: &RawLogEvent) -> &str {
    match event.op {
        Op::Exit => "",
        Op::Enter | Op::Note => &event.name,
    }
}
