//! # Structured text log encoding
//!
//! An ordered JSON array of 5-field records:
//!
//! ```text
//! [[operation, threadId, frameId, timestampNanoseconds, name], ...]
//! ```
//!
//! Field semantics are identical to the binary form, including the integer
//! operation tags and the `-1` frame sentinel. This is also the fallback
//! decoding for any buffer that does not start with the binary magic.

use serde::{Deserialize, Serialize};

use crate::domain::{FormatError, FrameId, ThreadId};

use super::{validate_name, wire_name, Op, RawLogEvent};

/// One record as it appears on the wire.
#[derive(Serialize, Deserialize)]
struct WireRecord(u8, u64, i32, u64, String);

/// Encode a sequence of events as structured text.
pub fn encode(events: &[RawLogEvent]) -> Result<Vec<u8>, FormatError> {
    let mut records = Vec::with_capacity(events.len());
    for event in events {
        let name = wire_name(event);
        validate_name(name)?;
        records.push(WireRecord(
            event.op.tag(),
            event.thread_id.0,
            FrameId::to_wire(event.frame),
            event.timestamp_ns,
            name.to_string(),
        ));
    }
    Ok(serde_json::to_vec(&records)?)
}

/// Decode structured text. All-or-nothing: any malformed record fails the
/// whole decode.
pub fn decode(bytes: &[u8]) -> Result<Vec<RawLogEvent>, FormatError> {
    let records: Vec<WireRecord> =
        serde_json::from_slice(bytes).map_err(FormatError::UnrecognizedFormat)?;

    let mut events = Vec::with_capacity(records.len());
    for WireRecord(tag, thread, frame, timestamp_ns, name) in records {
        if !name.is_ascii() {
            return Err(FormatError::NameNotAscii);
        }
        events.push(RawLogEvent {
            op: Op::from_tag(tag)?,
            thread_id: ThreadId(thread),
            frame: FrameId::from_wire(frame),
            timestamp_ns,
            name,
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_every_field() {
        let events = vec![
            RawLogEvent::enter(ThreadId(3), Some(FrameId(1)), 100, "step"),
            RawLogEvent::exit(ThreadId(3), Some(FrameId(1)), 900),
            RawLogEvent::note(ThreadId(3), None, 950, "note text"),
        ];
        let encoded = encode(&events).unwrap();
        assert_eq!(decode(&encoded).unwrap(), events);
    }

    #[test]
    fn test_records_are_plain_arrays() {
        let events = vec![RawLogEvent::enter(ThreadId(3), None, 100, "step")];
        let encoded = encode(&events).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(value[0][0], 0);
        assert_eq!(value[0][1], 3);
        assert_eq!(value[0][2], -1);
        assert_eq!(value[0][3], 100);
        assert_eq!(value[0][4], "step");
    }

    #[test]
    fn test_malformed_record_fails_whole_decode() {
        // Second record is missing fields.
        let err = decode(br#"[[0, 1, -1, 100, "a"], [1, 2]]"#).unwrap_err();
        assert!(matches!(err, FormatError::UnrecognizedFormat(_)));
    }

    #[test]
    fn test_bad_operation_tag_fails() {
        let err = decode(br#"[[7, 1, -1, 100, "a"]]"#).unwrap_err();
        assert!(matches!(err, FormatError::UnknownOperation(7)));
    }
}
