//! # Demo log generator
//!
//! Produces a deterministic synthetic event stream: a handful of frames,
//! two threads, nested work blocks of varying depth, and a note per frame.
//! Useful for exercising the replay and report pipeline without
//! instrumenting a real application.

use crate::domain::{FrameId, ThreadId};
use crate::wire::RawLogEvent;

const FRAMES: i32 = 5;
const THREADS: u64 = 2;
const TOP_BLOCKS_PER_FRAME: usize = 3;
const MAX_DEPTH: usize = 3;

/// Small deterministic generator so demo output is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    /// Value in `low..=high`.
    fn range(&mut self, low: u64, high: u64) -> u64 {
        low + self.next() % (high - low + 1)
    }
}

/// Build the synthetic stream.
#[must_use]
pub fn generate() -> Vec<RawLogEvent> {
    let mut events = Vec::new();
    let mut rng = Lcg(0x5EED);

    for thread in 0..THREADS {
        let thread_id = ThreadId(thread + 1);
        // Per-thread clock, nanoseconds.
        let mut now: u64 = 1_000_000;
        for frame in 0..FRAMES {
            let frame = Some(FrameId(frame));
            for block in 0..TOP_BLOCKS_PER_FRAME {
                let name = format!("Block_{block}");
                emit_block(&mut events, &mut rng, &mut now, thread_id, frame, &name, 0);
            }
            events.push(RawLogEvent::note(thread_id, frame, now, "frame complete"));
        }
    }

    events
}

fn emit_block(
    events: &mut Vec<RawLogEvent>,
    rng: &mut Lcg,
    now: &mut u64,
    thread_id: ThreadId,
    frame: Option<FrameId>,
    name: &str,
    depth: usize,
) {
    events.push(RawLogEvent::enter(thread_id, frame, *now, name));
    *now += rng.range(10_000, 20_000);

    if depth < MAX_DEPTH {
        for child in 0..rng.range(0, 3) {
            let child_name = format!("{name}_{depth}_{child}");
            emit_block(events, rng, now, thread_id, frame, &child_name, depth + 1);
        }
    }

    *now += rng.range(10_000, 20_000);
    events.push(RawLogEvent::exit(thread_id, frame, *now));
}
