//! Structured error types for perfscope
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Errors produced while encoding or decoding a persisted event log.
///
/// A decode failure is all-or-nothing: the caller never receives a partial
/// event stream.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("truncated binary record at byte {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("unknown operation tag {0}")]
    UnknownOperation(u8),

    #[error("event name is not ASCII")]
    NameNotAscii,

    #[error("event name length {0} does not fit the 2-byte length field")]
    NameTooLong(usize),

    #[error("too many records for the 4-byte count field: {0}")]
    TooManyRecords(usize),

    #[error("log has no binary magic and is not valid structured text: {0}")]
    UnrecognizedFormat(#[source] serde_json::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
