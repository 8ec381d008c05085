//! End-to-end pipeline tests: encode -> decode -> replay -> aggregate ->
//! render, driven by hand-built wire streams with known timing.

use perfscope::analysis::{build_report, Aggregation, GroupingMode, ReportOptions};
use perfscope::domain::{FrameId, ThreadId};
use perfscope::render;
use perfscope::replay;
use perfscope::timing::UNKNOWN_SCOPE;
use perfscope::wire::{binary, RawLogEvent};

const T1: ThreadId = ThreadId(1);

/// Two frames on one thread. Frame 0 spans 120 ms with a nested region,
/// frame 1 spans 2 ms.
fn two_frame_stream() -> Vec<RawLogEvent> {
    let f0 = Some(FrameId(0));
    let f1 = Some(FrameId(1));
    vec![
        // Frame 0: A [100ms, 220ms), B [120ms, 180ms) nested inside A.
        RawLogEvent::enter(T1, f0, 100_000_000, "A"),
        RawLogEvent::enter(T1, f0, 120_000_000, "B"),
        RawLogEvent::note(T1, f0, 130_000_000, "inside B"),
        RawLogEvent::exit(T1, f0, 180_000_000),
        RawLogEvent::exit(T1, f0, 220_000_000),
        // Frame 1: C [300ms, 302ms).
        RawLogEvent::enter(T1, f1, 300_000_000, "C"),
        RawLogEvent::exit(T1, f1, 302_000_000),
    ]
}

#[test]
fn test_persisted_log_replays_with_live_durations() {
    let bytes = binary::encode(&two_frame_stream()).expect("encode");
    let data = replay::from_bytes(&bytes).expect("decode and replay");

    assert_eq!(data.events.len(), 3);
    let b = data.events.iter().find(|e| e.scope_name == "A::B").expect("A::B");
    assert!((b.inclusive - 0.060).abs() < 1e-9);
    assert!((b.exclusive - 0.060).abs() < 1e-9);

    let a = data.events.iter().find(|e| e.scope_name == "A").expect("A");
    assert!((a.inclusive - 0.120).abs() < 1e-9);
    // A's exclusive time excludes the 60 ms spent in B.
    assert!((a.exclusive - 0.060).abs() < 1e-9);
}

#[test]
fn test_report_buckets_frames_and_builds_combined() {
    let data = replay::replay(&two_frame_stream());
    let report = build_report(&data, &ReportOptions::default());

    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.frames[0].frame, Some(FrameId(0)));
    assert_eq!(report.frames[1].frame, Some(FrameId(1)));
    assert!(report.combined.is_some());

    let frame0 = &report.frames[0];
    assert!((frame0.bounds.span() - 0.120).abs() < 1e-9);
    assert_eq!(frame0.annotations.len(), 1);
    // Annotation timestamps are relative to the frame's start.
    assert!((frame0.annotations[0].timestamp - 0.030).abs() < 1e-9);
}

#[test]
fn test_min_frame_filter_applies_through_the_pipeline() {
    let data = replay::replay(&two_frame_stream());
    let options = ReportOptions {
        mode: GroupingMode::Tree,
        min_frame_time_ms: Some(5.0),
    };
    let report = build_report(&data, &options);

    // Frame 1 spans only 2 ms and is dropped whole.
    assert_eq!(report.frames.len(), 1);
    assert_eq!(report.frames[0].frame, Some(FrameId(0)));
    assert!(report.combined.is_none());
}

#[test]
fn test_tree_report_nests_child_under_parent() {
    let data = replay::replay(&two_frame_stream());
    let report = build_report(&data, &ReportOptions::default());

    let Aggregation::Tree(roots) = &report.frames[0].cumulative else {
        panic!("expected tree aggregation");
    };
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].entry.key, "A");
    assert_eq!(roots[0].children.len(), 1);
    assert_eq!(roots[0].children[0].entry.key, "A::B");
}

#[test]
fn test_partial_stream_surfaces_unknown_scope_in_report() {
    let f0 = Some(FrameId(0));
    // The log starts mid-region: an exit arrives before any enter.
    let events = vec![
        RawLogEvent::exit(T1, f0, 50_000_000),
        RawLogEvent::enter(T1, f0, 80_000_000, "Late"),
        RawLogEvent::exit(T1, f0, 100_000_000),
    ];
    let data = replay::replay(&events);
    let report = build_report(&data, &ReportOptions::default());

    let Aggregation::Tree(roots) = &report.frames[0].cumulative else {
        panic!("expected tree aggregation");
    };
    let keys: Vec<&str> = roots.iter().map(|n| n.entry.key.as_str()).collect();
    assert!(keys.contains(&UNKNOWN_SCOPE));
    assert!(keys.contains(&"Late"));
}

#[test]
fn test_rendered_text_contains_frames_scopes_and_notes() {
    let data = replay::replay(&two_frame_stream());
    let report = build_report(&data, &ReportOptions::default());

    let mut out = Vec::new();
    render::render(&mut out, &report, "pipeline.bin").expect("render");
    let text = String::from_utf8(out).expect("utf-8");

    assert!(text.contains("pipeline.bin"));
    assert!(text.contains("Frame #0"));
    assert!(text.contains("Frame #1"));
    assert!(text.contains("All frames"));
    assert!(text.contains('A'));
    assert!(text.contains('B'));
    assert!(text.contains("inside B"));
}

#[test]
fn test_empty_log_renders_nothing() {
    let bytes = binary::encode(&[]).expect("encode");
    let data = replay::from_bytes(&bytes).expect("replay");
    let report = build_report(&data, &ReportOptions::default());
    assert!(report.is_empty());

    let mut out = Vec::new();
    render::render(&mut out, &report, "empty").expect("render");
    assert!(out.is_empty());
}
