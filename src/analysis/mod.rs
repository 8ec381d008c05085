//! Aggregation of completed measurements
//!
//! - `aggregate`: groups measurements into per-scope statistics, either by
//!   full scope name (tree) or by terminal name (flat)
//! - `report`: buckets measurements per frame and per thread, applies the
//!   minimum-frame-duration filter, and assembles the structure handed to
//!   the report renderer

pub mod aggregate;
pub mod report;

pub use aggregate::{aggregate, leaf_name, AggregateEntry, AggregateNode, Aggregation, GroupingMode};
pub use report::{build_report, FrameBounds, ProfileReport, ReportOptions, ScopeReport, ThreadReport};
