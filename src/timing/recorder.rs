//! # Event recorder
//!
//! Append-only collection point for finished measurements and annotations.
//! Arbitrary threads append concurrently during the collection phase; one
//! consumer drains the queue to empty during the report phase. No ordering
//! is guaranteed across producers; within one thread, children land before
//! their parent's completion.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::scope_stack::{Annotation, CompletedEvent};
use super::ProfileData;

/// One item appended to the recorder.
#[derive(Debug, Clone)]
pub enum Record {
    Completed(CompletedEvent),
    Note(Annotation),
}

/// Cloneable producer side of the recorder queue.
#[derive(Debug, Clone)]
pub struct RecorderHandle {
    tx: Sender<Record>,
}

impl RecorderHandle {
    pub fn completed(&self, event: CompletedEvent) {
        // Send only fails when the recorder was dropped; measurements taken
        // after that are an accepted loss.
        let _ = self.tx.send(Record::Completed(event));
    }

    pub fn note(&self, annotation: Annotation) {
        let _ = self.tx.send(Record::Note(annotation));
    }
}

/// Multi-producer queue of completed measurements.
#[derive(Debug)]
pub struct EventRecorder {
    tx: Sender<Record>,
    rx: Receiver<Record>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Producer handle for a collecting thread.
    #[must_use]
    pub fn handle(&self) -> RecorderHandle {
        RecorderHandle { tx: self.tx.clone() }
    }

    /// Drain everything appended so far.
    ///
    /// Called once per report pass, single-threaded, after instrumentation
    /// has logically paused for that pass.
    #[must_use]
    pub fn drain(&self) -> ProfileData {
        let mut data = ProfileData::default();
        for record in self.rx.try_iter() {
            match record {
                Record::Completed(event) => data.events.push(event),
                Record::Note(annotation) => data.annotations.push(annotation),
            }
        }
        data
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}
