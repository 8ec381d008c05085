//! # Report assembly
//!
//! Buckets one report pass's measurements by frame, drops frames whose
//! total span falls below the configured minimum, and aggregates each
//! surviving bucket per thread and cumulatively. The resulting
//! [`ProfileReport`] is the complete interface handed to a renderer:
//! aggregations, frame boundary timestamps for timelines, and annotations
//! rebased relative to their frame's start.

use std::collections::BTreeMap;

use log::debug;

use crate::domain::{FrameId, ThreadId};
use crate::timing::{Annotation, CompletedEvent, ProfileData};

use super::aggregate::{aggregate, Aggregation, GroupingMode};

/// Configuration for one report pass.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub mode: GroupingMode,
    /// Frames whose total span is below this many milliseconds are dropped
    /// whole — events and annotations alike.
    pub min_frame_time_ms: Option<f64>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { mode: GroupingMode::Tree, min_frame_time_ms: None }
    }
}

/// Earliest start and latest end over one bucket's measurements, for
/// building timelines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBounds {
    pub earliest_start: f64,
    pub latest_end: f64,
}

impl FrameBounds {
    /// Total span of the bucket, in seconds.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.latest_end - self.earliest_start
    }
}

/// Aggregation for one thread within a bucket.
#[derive(Debug)]
pub struct ThreadReport {
    pub thread_id: ThreadId,
    pub aggregation: Aggregation,
}

/// One requested scope: a single frame bucket, or the combined set.
#[derive(Debug)]
pub struct ScopeReport {
    /// `None` for measurements taken outside any frame, and for the
    /// combined all-frames report.
    pub frame: Option<FrameId>,
    pub bounds: FrameBounds,
    /// Per-thread aggregations, ordered by thread id.
    pub threads: Vec<ThreadReport>,
    /// Aggregation over every thread in this bucket.
    pub cumulative: Aggregation,
    /// Annotations with timestamps relative to `bounds.earliest_start`.
    pub annotations: Vec<Annotation>,
}

/// Full output of one report pass.
#[derive(Debug, Default)]
pub struct ProfileReport {
    /// One report per surviving frame bucket, unframed bucket first, then
    /// ascending frame id.
    pub frames: Vec<ScopeReport>,
    /// Combined report across all surviving buckets, present when more than
    /// one bucket survived.
    pub combined: Option<ScopeReport>,
}

impl ProfileReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Assemble the report for one pass. Empty input yields an empty report,
/// which is a valid, non-error outcome.
#[must_use]
pub fn build_report(data: &ProfileData, options: &ReportOptions) -> ProfileReport {
    // Bucket by frame. BTreeMap gives the output order: None first, then
    // ascending frame id.
    let mut buckets: BTreeMap<Option<FrameId>, Vec<&CompletedEvent>> = BTreeMap::new();
    for event in &data.events {
        buckets.entry(event.frame).or_default().push(event);
    }

    // Whole-frame pre-filter: a frame below the minimum span is dropped
    // entirely. The unframed bucket is not a frame and always survives.
    if let Some(min_ms) = options.min_frame_time_ms {
        buckets.retain(|frame, events| {
            if frame.is_none() {
                return true;
            }
            let span_ms = bounds_of(events).span() * 1000.0;
            let keep = span_ms >= min_ms;
            if !keep {
                debug!(
                    "dropping {} (span {span_ms:.3} ms < {min_ms} ms)",
                    frame.map_or_else(|| "unframed".to_string(), |f| f.to_string()),
                );
            }
            keep
        });
    }

    let mut report = ProfileReport::default();
    let mut all_events: Vec<&CompletedEvent> = Vec::new();

    for (frame, events) in &buckets {
        let bounds = bounds_of(events);
        let annotations = annotations_for(data, *frame, bounds.earliest_start);
        report.frames.push(scope_report(*frame, events, bounds, annotations, options.mode));
        all_events.extend_from_slice(events);
    }

    if report.frames.len() > 1 {
        let bounds = bounds_of(&all_events);
        let annotations: Vec<Annotation> = buckets
            .keys()
            .flat_map(|frame| annotations_for(data, *frame, bounds.earliest_start))
            .collect();
        report.combined =
            Some(scope_report(None, &all_events, bounds, annotations, options.mode));
    }

    report
}

fn scope_report(
    frame: Option<FrameId>,
    events: &[&CompletedEvent],
    bounds: FrameBounds,
    annotations: Vec<Annotation>,
    mode: GroupingMode,
) -> ScopeReport {
    let mut by_thread: BTreeMap<ThreadId, Vec<&CompletedEvent>> = BTreeMap::new();
    for event in events {
        by_thread.entry(event.thread_id).or_default().push(event);
    }

    let threads = by_thread
        .into_iter()
        .map(|(thread_id, thread_events)| ThreadReport {
            thread_id,
            aggregation: aggregate(thread_events.into_iter(), mode),
        })
        .collect();

    ScopeReport {
        frame,
        bounds,
        threads,
        cumulative: aggregate(events.iter().copied(), mode),
        annotations,
    }
}

fn bounds_of(events: &[&CompletedEvent]) -> FrameBounds {
    let mut bounds = FrameBounds { earliest_start: f64::INFINITY, latest_end: f64::NEG_INFINITY };
    for event in events {
        bounds.earliest_start = bounds.earliest_start.min(event.start);
        bounds.latest_end = bounds.latest_end.max(event.end);
    }
    bounds
}

/// Annotations for one bucket, rebased relative to the bucket's start.
fn annotations_for(data: &ProfileData, frame: Option<FrameId>, start: f64) -> Vec<Annotation> {
    data.annotations
        .iter()
        .filter(|a| a.frame == frame)
        .map(|a| Annotation { timestamp: a.timestamp - start, ..a.clone() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(
        scope: &str,
        thread: u64,
        frame: Option<FrameId>,
        start: f64,
        end: f64,
    ) -> CompletedEvent {
        CompletedEvent {
            scope_name: scope.to_string(),
            inclusive: end - start,
            exclusive: end - start,
            thread_id: ThreadId(thread),
            frame,
            start,
            end,
        }
    }

    fn data_with_three_frames() -> ProfileData {
        ProfileData {
            events: vec![
                event("A", 1, Some(FrameId(0)), 0.0, 0.010),
                event("A", 1, Some(FrameId(1)), 0.010, 0.030),
                event("B", 1, Some(FrameId(1)), 0.032, 0.040),
                event("A", 1, Some(FrameId(2)), 0.040, 0.041),
            ],
            annotations: vec![],
        }
    }

    #[test]
    fn test_frame_duration_is_latest_end_minus_earliest_start() {
        let data = data_with_three_frames();
        let report = build_report(&data, &ReportOptions::default());

        let frame1 = report
            .frames
            .iter()
            .find(|f| f.frame == Some(FrameId(1)))
            .expect("frame 1 present");
        assert!((frame1.bounds.span() - 0.030).abs() < 1e-12);
        assert!((frame1.bounds.earliest_start - 0.010).abs() < 1e-12);
        assert!((frame1.bounds.latest_end - 0.040).abs() < 1e-12);
    }

    #[test]
    fn test_min_frame_filter_drops_whole_frames() {
        let data = data_with_three_frames();
        let options = ReportOptions {
            mode: GroupingMode::Tree,
            // Frame 0 spans 10 ms, frame 1 spans 30 ms, frame 2 spans 1 ms.
            min_frame_time_ms: Some(5.0),
        };
        let report = build_report(&data, &options);

        let frames: Vec<Option<FrameId>> = report.frames.iter().map(|f| f.frame).collect();
        assert_eq!(frames, vec![Some(FrameId(0)), Some(FrameId(1))]);
        // A surviving frame keeps all of its entries unfiltered.
        let frame1 = &report.frames[1];
        assert!(!frame1.cumulative.is_empty());
    }

    #[test]
    fn test_frame_at_threshold_survives() {
        let data = data_with_three_frames();
        let options =
            ReportOptions { mode: GroupingMode::Tree, min_frame_time_ms: Some(10.0) };
        let report = build_report(&data, &options);
        assert!(report.frames.iter().any(|f| f.frame == Some(FrameId(0))));
    }

    #[test]
    fn test_unframed_bucket_is_never_filtered() {
        let data = ProfileData {
            events: vec![event("A", 1, None, 0.0, 0.0001)],
            annotations: vec![],
        };
        let options =
            ReportOptions { mode: GroupingMode::Tree, min_frame_time_ms: Some(100.0) };
        let report = build_report(&data, &options);
        assert_eq!(report.frames.len(), 1);
        assert_eq!(report.frames[0].frame, None);
    }

    #[test]
    fn test_combined_report_present_only_with_multiple_buckets() {
        let data = data_with_three_frames();
        let report = build_report(&data, &ReportOptions::default());
        assert!(report.combined.is_some());

        let single = ProfileData {
            events: vec![event("A", 1, None, 0.0, 1.0)],
            annotations: vec![],
        };
        let report = build_report(&single, &ReportOptions::default());
        assert!(report.combined.is_none());
    }

    #[test]
    fn test_threads_are_split_and_ordered() {
        let data = ProfileData {
            events: vec![
                event("A", 2, None, 0.0, 1.0),
                event("B", 1, None, 0.0, 2.0),
            ],
            annotations: vec![],
        };
        let report = build_report(&data, &ReportOptions::default());
        let bucket = &report.frames[0];
        assert_eq!(bucket.threads.len(), 2);
        assert_eq!(bucket.threads[0].thread_id, ThreadId(1));
        assert_eq!(bucket.threads[1].thread_id, ThreadId(2));
    }

    #[test]
    fn test_annotations_are_rebased_to_frame_start() {
        let data = ProfileData {
            events: vec![event("A", 1, Some(FrameId(0)), 5.0, 6.0)],
            annotations: vec![Annotation {
                text: "mark".to_string(),
                thread_id: ThreadId(1),
                frame: Some(FrameId(0)),
                timestamp: 5.25,
            }],
        };
        let report = build_report(&data, &ReportOptions::default());
        let bucket = &report.frames[0];
        assert_eq!(bucket.annotations.len(), 1);
        assert!((bucket.annotations[0].timestamp - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_yields_empty_report() {
        let report = build_report(&ProfileData::default(), &ReportOptions::default());
        assert!(report.is_empty());
        assert!(report.combined.is_none());
    }
}
