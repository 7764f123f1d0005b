//! Snapshot assertions

use std::collections::BTreeSet;

use deepsort_cascade_rs::{CornerBox, ReportTier, TrackerSnapshot};

/// Assert corner boxes agree to within `tolerance` on every coordinate
pub fn assert_box_close(actual: &CornerBox, expected: &CornerBox, tolerance: f32, msg: &str) {
    let pairs = [
        (actual.x1, expected.x1),
        (actual.y1, expected.y1),
        (actual.x2, expected.x2),
        (actual.y2, expected.y2),
    ];
    for (a, e) in pairs {
        assert!(
            (a - e).abs() <= tolerance,
            "{}: {:?} vs {:?} (tolerance {})",
            msg,
            actual,
            expected,
            tolerance
        );
    }
}

/// Assert no identity appears twice in a snapshot, and none is 0
pub fn assert_unique_ids(snapshot: &TrackerSnapshot) {
    let mut seen = BTreeSet::new();
    for row in &snapshot.rows {
        assert!(!row.track_id.is_none(), "frame {}: unassigned row", snapshot.frame);
        assert!(
            seen.insert(row.track_id),
            "frame {}: duplicate identity {}",
            snapshot.frame,
            row.track_id
        );
    }
}

/// Order of reporting tiers; a live track never moves down
pub fn tier_rank(tier: ReportTier) -> u8 {
    match tier {
        ReportTier::New => 0,
        ReportTier::Unstable => 1,
        ReportTier::Stable => 2,
    }
}
