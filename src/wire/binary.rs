//! # Binary log encoding
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic   u32   0xFA57
//! count   u32   number of records
//! record  op u8 | thread u64 | frame i32 (-1 = none) | timestamp u64 ns
//!         | name_len u16 | name_len bytes of ASCII name
//! ```
//!
//! Exit records are written with a zero-length name. A record whose declared
//! name length (or fixed header) runs past the end of the buffer fails the
//! whole decode.

use crate::domain::{FormatError, FrameId, ThreadId};

use super::{validate_name, wire_name, Op, RawLogEvent};

/// Magic constant identifying the binary form.
pub const MAGIC: u32 = 0xFA57;

/// Fixed bytes per record: op + thread + frame + timestamp + name length.
const RECORD_FIXED_LEN: usize = 1 + 8 + 4 + 8 + 2;

/// Whether the buffer starts with the binary magic constant.
#[must_use]
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4] == MAGIC.to_le_bytes()
}

/// Encode a sequence of events into the binary form.
#[allow(clippy::cast_possible_truncation)] // name length validated against u16
pub fn encode(events: &[RawLogEvent]) -> Result<Vec<u8>, FormatError> {
    let count =
        u32::try_from(events.len()).map_err(|_| FormatError::TooManyRecords(events.len()))?;

    let mut out = Vec::with_capacity(8 + events.len() * RECORD_FIXED_LEN);
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());

    for event in events {
        let name = wire_name(event);
        validate_name(name)?;

        out.push(event.op.tag());
        out.extend_from_slice(&event.thread_id.0.to_le_bytes());
        out.extend_from_slice(&FrameId::to_wire(event.frame).to_le_bytes());
        out.extend_from_slice(&event.timestamp_ns.to_le_bytes());
        // validate_name guarantees the length fits.
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
    }

    Ok(out)
}

/// Decode the binary form. All-or-nothing: any truncated record fails the
/// whole decode.
pub fn decode(bytes: &[u8]) -> Result<Vec<RawLogEvent>, FormatError> {
    let mut reader = Reader { bytes, offset: 0 };

    // Caller already dispatched on the magic, but re-check so this function
    // is safe to call directly.
    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(FormatError::Truncated { offset: 0, needed: 0 });
    }

    let count = reader.u32()? as usize;
    // The declared count is untrusted input; cap the preallocation by the
    // number of records the remaining bytes could possibly hold. An inflated
    // count still fails as truncated once the bytes run out.
    let max_records = bytes.len().saturating_sub(8) / RECORD_FIXED_LEN;
    let mut events = Vec::with_capacity(count.min(max_records));

    for _ in 0..count {
        let op = Op::from_tag(reader.u8()?)?;
        let thread_id = ThreadId(reader.u64()?);
        let frame = FrameId::from_wire(reader.i32()?);
        let timestamp_ns = reader.u64()?;
        let name_len = usize::from(reader.u16()?);
        let name_bytes = reader.take(name_len)?;
        if !name_bytes.is_ascii() {
            return Err(FormatError::NameNotAscii);
        }
        let name =
            String::from_utf8(name_bytes.to_vec()).map_err(|_| FormatError::NameNotAscii)?;

        events.push(RawLogEvent { op, thread_id, frame, timestamp_ns, name });
    }

    Ok(events)
}

/// Bounds-checked cursor over the input buffer.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let remaining = self.bytes.len() - self.offset;
        if remaining < len {
            return Err(FormatError::Truncated {
                offset: self.offset,
                needed: len - remaining,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, FormatError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, FormatError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32, FormatError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, FormatError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }
}
