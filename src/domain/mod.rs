//! Core domain types and errors
//!
//! Newtypes keep thread and frame identifiers from being mixed up with the
//! raw integers that travel on the wire, and give them self-documenting
//! `Display` output in reports.

pub mod errors;
pub mod types;

pub use errors::FormatError;
pub use types::{FrameId, ThreadId};
