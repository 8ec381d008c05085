//! CLI argument definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::analysis::GroupingMode;

#[derive(Parser)]
#[command(
    name = "perfscope",
    about = "Replay recorded timing logs into aggregated performance reports",
    after_help = "\
EXAMPLES:
    perfscope metrics.bin                        Tree report on stdout
    perfscope metrics.bin --mode flat            Merge scopes by terminal name
    perfscope metrics.json --min-frame-time 5    Drop frames shorter than 5 ms
    perfscope --demo sample.bin                  Write a synthetic demo log"
)]
pub struct Args {
    /// Recorded event log to replay (binary or structured text)
    #[arg(value_name = "LOG")]
    pub log: Option<PathBuf>,

    /// Grouping mode for aggregation
    #[arg(long, value_enum, default_value_t = Mode::Tree)]
    pub mode: Mode,

    /// Drop frames whose total span is below this many milliseconds
    #[arg(long, value_name = "MS")]
    pub min_frame_time: Option<f64>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report title (defaults to the log file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Generate a synthetic demo log at this path and exit
    #[arg(long, value_name = "FILE", conflicts_with = "log")]
    pub demo: Option<PathBuf>,

    /// Encoding for the generated demo log
    #[arg(long, value_enum, default_value_t = DemoFormat::Binary, requires = "demo")]
    pub demo_format: DemoFormat,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    Tree,
    Flat,
}

impl From<Mode> for GroupingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Tree => GroupingMode::Tree,
            Mode::Flat => GroupingMode::Flat,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DemoFormat {
    Binary,
    Json,
}
