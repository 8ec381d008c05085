//! Command-line interface
//!
//! Argument definitions plus the synthetic demo-log generator used to
//! produce sample input without instrumenting an application.

pub mod args;
pub mod demo;

pub use args::{Args, DemoFormat, Mode};
