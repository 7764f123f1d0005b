//! Concurrent snapshot publishing
//!
//! A producer thread runs the tracker while consumer threads read the
//! published snapshots. Readers must only ever see complete snapshots, in
//! publication order.

mod helpers;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use deepsort_cascade_rs::{ScenarioConfig, Tracker, TrackerConfig};

use helpers::assertions::assert_unique_ids;
use helpers::fixtures::scenario;

#[test]
fn test_readers_see_complete_snapshots_in_order() {
    let frames = scenario(
        ScenarioConfig {
            num_frames: 200,
            ..ScenarioConfig::default()
        },
        21,
    );
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let reader = tracker.reader();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_sequence = 0;
                let mut observed = 0;
                loop {
                    let finished = done.load(Ordering::Acquire);
                    let published = reader.latest();
                    assert!(published.sequence >= last_sequence);
                    if published.sequence > 0 {
                        // Sequence and frame advance together; no call fails here
                        assert_eq!(published.snapshot.frame, published.sequence);
                        assert_unique_ids(&published.snapshot);
                        let rows = &published.snapshot.rows;
                        assert!(rows.windows(2).all(|w| w[0].track_id < w[1].track_id));
                    }
                    last_sequence = published.sequence;
                    observed += 1;
                    if finished {
                        break;
                    }
                }
                observed
            })
        })
        .collect();

    let producer = thread::spawn(move || {
        for mut frame in frames {
            tracker.byte_track_objects(&mut frame.detections, false).unwrap();
        }
        tracker
    });

    let tracker = producer.join().unwrap();
    done.store(true, Ordering::Release);
    for r in readers {
        assert!(r.join().unwrap() > 0);
    }

    let latest = tracker.reader().latest();
    assert_eq!(latest.sequence, 200);
    assert_eq!(latest.snapshot.frame, 200);
}

#[test]
fn test_held_snapshot_outlives_later_frames() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let reader = tracker.reader();
    let mut frames = scenario(ScenarioConfig::default(), 8).into_iter();

    let mut first = frames.next().unwrap();
    let snap = tracker.byte_track_objects(&mut first.detections, false).unwrap();
    let held = reader.latest();

    for mut frame in frames.take(10) {
        tracker.byte_track_objects(&mut frame.detections, false).unwrap();
    }
    assert_eq!(held.snapshot, snap);
    assert_eq!(reader.sequence(), 11);
}
