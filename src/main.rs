//! # perfscope - Main Entry Point
//!
//! Two operational modes:
//! - **Replay** (`perfscope <LOG>`): decode a recorded event log, replay it
//!   through the timing model, and print aggregated report tables
//! - **Demo** (`perfscope --demo <FILE>`): write a synthetic event log for
//!   trying out the pipeline

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use perfscope::analysis::{build_report, ReportOptions};
use perfscope::cli::{demo, Args, DemoFormat};
use perfscope::render;
use perfscope::replay;
use perfscope::wire;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if let Some(demo_path) = &args.demo {
        return write_demo_log(demo_path, args.demo_format, args.quiet);
    }

    let Some(log_path) = &args.log else {
        anyhow::bail!(
            "missing required argument: LOG or --demo\n\n\
             Usage:\n  \
             perfscope metrics.bin           Replay a recorded log\n  \
             perfscope --demo sample.bin     Generate a demo log\n\n\
             Run 'perfscope --help' for more options"
        );
    };

    let bytes = std::fs::read(log_path)
        .with_context(|| format!("failed to read log file {}", log_path.display()))?;
    let events = wire::decode(&bytes)
        .with_context(|| format!("failed to decode {}", log_path.display()))?;
    info!("log provides {} events", events.len());

    if !args.quiet {
        println!("perfscope v{}", env!("CARGO_PKG_VERSION"));
        println!("log: {} ({} events)", log_path.display(), events.len());
    }

    let data = replay::replay(&events);
    info!(
        "replayed {} measurements, {} annotations",
        data.events.len(),
        data.annotations.len()
    );

    let options = ReportOptions {
        mode: args.mode.into(),
        min_frame_time_ms: args.min_frame_time,
    };
    let report = build_report(&data, &options);

    let title = args.name.clone().unwrap_or_else(|| title_from(log_path));

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create report file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            render::render(&mut writer, &report, &title)?;
            writer.flush()?;
            if !args.quiet {
                println!("saved: {}", path.display());
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            render::render(&mut handle, &report, &title)?;
        }
    }

    Ok(())
}

fn write_demo_log(path: &Path, format: DemoFormat, quiet: bool) -> Result<()> {
    let events = demo::generate();
    let bytes = match format {
        DemoFormat::Binary => wire::binary::encode(&events),
        DemoFormat::Json => wire::json::encode(&events),
    }
    .context("failed to encode demo log")?;

    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write demo log {}", path.display()))?;
    if !quiet {
        println!("saved: {} ({} events)", path.display(), events.len());
    }
    Ok(())
}

fn title_from(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
