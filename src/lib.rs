//! # perfscope - Hierarchical Wall-Clock Profiling
//!
//! perfscope instruments nested, named regions of code with wall-clock
//! timers across many threads and optional application-defined frames
//! (repeated units of work such as render or simulation ticks), and turns
//! the measurements into aggregated statistics grouped by scope identity.
//!
//! ## Architecture Overview
//!
//! ```text
//!              live path                        persisted path
//!
//!  instrumented threads                     recorded event log
//!          │                                        │
//!          ▼                                        ▼
//!  ┌───────────────┐                        ┌───────────────┐
//!  │  ScopeStack   │  one per thread        │  wire codec   │ binary / text
//!  │  (timing)     │                        │  (decode)     │
//!  └───────┬───────┘                        └───────┬───────┘
//!          │ completed measurements                 │ raw events
//!          ▼                                        ▼
//!  ┌───────────────┐                        ┌───────────────┐
//!  │ EventRecorder │                        │   Replayer    │ one stack
//!  │  (queue)      │                        │               │ per thread
//!  └───────┬───────┘                        └───────┬───────┘
//!          │                                        │
//!          └──────────────────┬─────────────────────┘
//!                             ▼
//!                     ┌───────────────┐
//!                     │  Aggregator   │ per frame, per thread,
//!                     │  (analysis)   │ cumulative; tree or flat
//!                     └───────┬───────┘
//!                             ▼
//!                     ┌───────────────┐
//!                     │   Renderer    │ text tables
//!                     └───────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`timing`]: per-thread call-stack model (inclusive vs. exclusive
//!   durations), the multi-producer event recorder, and the live
//!   instrumentation entry points with scoped region guards
//! - [`wire`]: the two interchangeable log encodings (compact binary behind
//!   a magic constant, structured JSON text) and the magic-dispatch decoder
//! - [`replay`]: reconstructs per-thread timing from a persisted stream,
//!   tolerating logs that start mid-region
//! - [`analysis`]: aggregation into per-scope statistics and assembly of
//!   per-frame / per-thread reports, including the whole-frame
//!   minimum-duration filter
//! - [`render`]: plain-text report tables
//! - [`cli`], [`domain`]: argument parsing and shared identifier/error types
//!
//! ## Key Concepts
//!
//! - **scope name**: enclosing block names joined with `::`, unique only
//!   within one thread's current call path
//! - **inclusive / exclusive duration**: total wall time a region was open
//!   vs. the time attributed to the region itself, excluding children
//! - **frame**: optional application-defined iteration counter used to
//!   bucket measurements for separate reports

pub mod analysis;
pub mod cli;
pub mod domain;
pub mod render;
pub mod replay;
pub mod timing;
pub mod wire;
