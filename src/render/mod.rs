//! Report rendering
//!
//! Presentation side of the pipeline. The aggregation layer hands over an
//! ordered [`ProfileReport`](crate::analysis::ProfileReport); renderers walk
//! it without reaching back into the measurement model.

pub mod text;

pub use text::render;
