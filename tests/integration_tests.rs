//! Integration tests for the tracker calls
//!
//! End-to-end runs of short hand-written sequences through the public API,
//! checking identities, reporting tiers and snapshots frame by frame.

mod helpers;

use deepsort_cascade_rs::{
    ClassId, FeatureBlob, ReportTier, TrackId, Tracker, TrackerConfig, TrackerError,
};

use helpers::assertions::assert_box_close;
use helpers::fixtures::{det, face, person_with_feature, tracker_with_max_age, CAR, PERSON};

const BOX: [f32; 4] = [10.0, 10.0, 50.0, 50.0];

/// A person is created, persists, coasts through empty frames and is retired
#[test]
fn test_person_lifecycle_through_retirement() {
    let mut tracker = tracker_with_max_age(3);

    let mut dets = vec![det(PERSON, BOX, 0.9)];
    let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[0].track_id, TrackId(1));
    assert_eq!(dets[0].track_state, Some(ReportTier::New));
    assert_eq!(snap.len(), 1);

    let mut dets = vec![det(PERSON, BOX, 0.9)];
    let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[0].track_id, TrackId(1));
    assert_eq!(dets[0].track_state, Some(ReportTier::Unstable));
    assert_eq!(snap.get(TrackId(1)).map(|r| r.time_since_update), Some(0));

    // No person detections: the class is still ticked forward
    let snap = tracker.byte_track_objects(&mut [], false).unwrap();
    let row = snap.get(TrackId(1)).expect("track retained");
    assert_eq!(row.time_since_update, 1);
    assert_eq!(row.out_count, 1);

    for tsu in 2..=3 {
        let snap = tracker.byte_track_objects(&mut [], false).unwrap();
        assert_eq!(snap.get(TrackId(1)).map(|r| r.time_since_update), Some(tsu));
    }

    // Fourth consecutive miss exceeds max_age = 3
    let snap = tracker.byte_track_objects(&mut [], false).unwrap();
    assert!(snap.get(TrackId(1)).is_none());
    assert!(snap.is_empty());
    assert_eq!(tracker.tracks().count(), 0);
    assert_eq!(tracker.frame(), 6);
}

/// Identical boxes of different classes never share a track
#[test]
fn test_classes_never_cross_match() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();

    let mut dets = vec![det(PERSON, BOX, 0.9), det(CAR, BOX, 0.9)];
    tracker.byte_track_objects(&mut dets, false).unwrap();
    let (person_id, car_id) = (dets[0].track_id, dets[1].track_id);
    assert_ne!(person_id, car_id);

    let mut dets = vec![det(CAR, BOX, 0.9), det(PERSON, BOX, 0.9)];
    tracker.byte_track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[0].track_id, car_id);
    assert_eq!(dets[1].track_id, person_id);

    // Only a car at the shared position: the person track takes nothing
    let mut dets = vec![det(CAR, BOX, 0.9)];
    let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[0].track_id, car_id);
    assert_eq!(snap.get(person_id).map(|r| r.time_since_update), Some(1));
    assert_eq!(snap.get(person_id).map(|r| r.class_id), Some(PERSON));
}

/// Detections below the low threshold leave the registry untouched
#[test]
fn test_below_low_threshold_is_noop() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();

    let mut dets = vec![det(PERSON, BOX, 0.05)];
    let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
    assert!(snap.is_empty());
    assert_eq!(dets[0].track_id, TrackId::NONE);
    assert_eq!(dets[0].track_state, None);
    assert_eq!(tracker.registry().peek_next_id(), TrackId(1));

    tracker.byte_track_objects(&mut [det(PERSON, BOX, 0.9)], false).unwrap();
    let mut dets = vec![det(PERSON, BOX, 0.05)];
    let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[0].track_id, TrackId::NONE);
    assert_eq!(snap.get(TrackId(1)).map(|r| r.time_since_update), Some(1));
}

/// Low-tier detections extend tracks but never start them
#[test]
fn test_low_tier_extends_but_never_creates() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();

    let mut dets = vec![det(PERSON, BOX, 0.3)];
    let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
    assert!(snap.is_empty());
    assert_eq!(dets[0].track_id, TrackId::NONE);

    tracker.byte_track_objects(&mut [det(PERSON, BOX, 0.9)], false).unwrap();
    let mut dets = vec![det(PERSON, BOX, 0.3)];
    let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
    let id = dets[0].track_id;
    assert!(!id.is_none());
    assert_eq!(dets[0].track_state, Some(ReportTier::Unstable));
    assert_eq!(snap.get(id).map(|r| r.time_since_update), Some(0));
}

/// The single-tier call treats every score as high confidence
#[test]
fn test_single_tier_call_creates_from_any_score() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let mut dets = vec![det(PERSON, BOX, 0.3)];
    tracker.track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[0].track_id, TrackId(1));
    assert_eq!(dets[0].track_state, Some(ReportTier::New));
}

/// A high-tier detection keeps its match even when a low-tier detection
/// fits the track better
#[test]
fn test_high_tier_matched_before_low_tier() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    tracker.byte_track_objects(&mut [det(PERSON, BOX, 0.9)], false).unwrap();

    let mut dets = vec![
        det(PERSON, BOX, 0.3),
        det(PERSON, [14.0, 12.0, 54.0, 52.0], 0.8),
    ];
    tracker.byte_track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[1].track_id, TrackId(1));
    assert_eq!(dets[0].track_id, TrackId::NONE);
}

/// Identical box and feature on an existing track: matched, no drift
#[test]
fn test_pass_through_has_no_drift() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let feature = [12, -7, 33, 90, -64, 5, 0, 18];

    tracker
        .track_objects(&mut [person_with_feature(BOX, 0.9, &feature)], true)
        .unwrap();
    for _ in 0..3 {
        let mut dets = vec![person_with_feature(BOX, 0.9, &feature)];
        let snap = tracker.track_objects(&mut dets, true).unwrap();
        assert_eq!(dets[0].track_id, TrackId(1));

        let row = snap.get(TrackId(1)).unwrap();
        assert_eq!(row.time_since_update, 0);
        assert_box_close(&row.bbox, &dets[0].bbox, 1e-4, "pass-through box");
    }
}

/// NEW is reported once; continuous matches advance to STABLE and stay there
#[test]
fn test_new_reported_once_then_stable() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let expected = [
        ReportTier::New,
        ReportTier::Unstable,
        ReportTier::Stable,
        ReportTier::Stable,
        ReportTier::Stable,
    ];
    for tier in expected {
        let mut dets = vec![det(PERSON, BOX, 0.9)];
        let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
        assert_eq!(dets[0].track_state, Some(tier));
        assert_eq!(snap.get(TrackId(1)).map(|r| r.tier), Some(tier));
    }

    // A miss does not demote an accredited track
    let snap = tracker.byte_track_objects(&mut [], false).unwrap();
    assert_eq!(snap.get(TrackId(1)).map(|r| r.tier), Some(ReportTier::Stable));
}

/// Per-class retention from JSON configuration
#[test]
fn test_per_class_max_age_from_json() {
    let config = TrackerConfig::from_json_str(
        r#"{"lifecycle": {"max_age": 10, "max_age_per_class": {"2": 1}}}"#,
    )
    .unwrap();
    let mut tracker = Tracker::new(config).unwrap();

    let mut dets = vec![det(PERSON, BOX, 0.9), det(CAR, [200.0, 200.0, 260.0, 240.0], 0.9)];
    tracker.byte_track_objects(&mut dets, false).unwrap();
    let (person_id, car_id) = (dets[0].track_id, dets[1].track_id);

    let snap = tracker.byte_track_objects(&mut [], false).unwrap();
    assert!(snap.get(car_id).is_some());

    let snap = tracker.byte_track_objects(&mut [], false).unwrap();
    assert!(snap.get(car_id).is_none());
    assert!(snap.get(person_id).is_some());
}

/// A zero-quality face starts its own track instead of matching one
#[test]
fn test_zero_quality_face_never_matches() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let corners = [100.0, 100.0, 140.0, 150.0];

    let mut faces = vec![face(corners)];
    tracker.track_faces(&mut faces).unwrap();
    assert_eq!(faces[0].track_id, TrackId(1));

    let mut faces = vec![face(corners).with_quality(0.8, 0.0)];
    let snap = tracker.track_faces(&mut faces).unwrap();
    assert_eq!(faces[0].track_id, TrackId(2));
    assert_eq!(faces[0].track_state, Some(ReportTier::New));
    assert_eq!(snap.get(TrackId(1)).map(|r| r.time_since_update), Some(1));
    assert!(snap.rows.iter().all(|r| r.class_id == ClassId::AGNOSTIC));
}

/// Faces with consistent features are re-identified across frames
#[test]
fn test_faces_with_features_keep_identity() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let a = [100, -20, 3, 44];
    let b = [-90, 60, 12, -5];

    let mut faces = vec![
        face([0.0, 0.0, 40.0, 40.0]).with_feature(FeatureBlob::int8(&a)),
        face([300.0, 0.0, 340.0, 40.0]).with_feature(FeatureBlob::int8(&b)),
    ];
    tracker.track_faces(&mut faces).unwrap();
    let ids = [faces[0].track_id, faces[1].track_id];

    let mut faces = vec![
        face([302.0, 1.0, 342.0, 41.0]).with_feature(FeatureBlob::int8(&b)),
        face([1.0, 1.0, 41.0, 41.0]).with_feature(FeatureBlob::int8(&a)),
    ];
    tracker.track_faces(&mut faces).unwrap();
    assert_eq!(faces[0].track_id, ids[1]);
    assert_eq!(faces[1].track_id, ids[0]);
}

/// Reid on a class without identity is ignored rather than rejected
#[test]
fn test_reid_request_ignored_for_other_classes() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let mut dets = vec![
        det(CAR, BOX, 0.9).with_feature(FeatureBlob::int8(&[1, 2, 3])),
        det(CAR, [100.0, 10.0, 140.0, 50.0], 0.9).with_feature(FeatureBlob::int8(&[1, 2])),
    ];
    tracker.track_objects(&mut dets, true).unwrap();
    assert!(dets.iter().all(|d| !d.track_id.is_none()));
}

/// A class failing validation fails the frame without annotating anything
#[test]
fn test_inconsistent_features_fail_the_frame() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    tracker.track_objects(&mut [det(CAR, BOX, 0.9)], false).unwrap();
    let published = tracker.reader().sequence();

    let mut dets = vec![
        person_with_feature(BOX, 0.9, &[1, 2, 3, 4]),
        person_with_feature([100.0, 10.0, 140.0, 50.0], 0.9, &[1, 2, 3, 4, 5, 6, 7, 8]),
        det(CAR, BOX, 0.9),
    ];
    let err = tracker.track_objects(&mut dets, true).unwrap_err();
    assert!(matches!(err, TrackerError::InvalidArgument { .. }));
    assert!(dets.iter().all(|d| d.track_id.is_none() && d.track_state.is_none()));
    assert_eq!(tracker.reader().sequence(), published);
    assert_eq!(tracker.frame(), 2);

    // No person track was created; the next frame proceeds normally
    assert!(tracker.tracks().all(|t| t.class_id == CAR));
    let mut dets = vec![det(CAR, BOX, 0.9)];
    tracker.track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[0].track_id, TrackId(1));
}

/// A frame failing validation in one class creates no tracks in any class,
/// so every track is still reported NEW on the frame that creates it
#[test]
fn test_failed_frame_creates_nothing_in_other_classes() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();

    let mut dets = vec![
        person_with_feature(BOX, 0.9, &[1, 2]),
        person_with_feature([100.0, 10.0, 140.0, 50.0], 0.9, &[1, 2, 3]),
        det(CAR, [200.0, 200.0, 260.0, 240.0], 0.9),
    ];
    let err = tracker.byte_track_objects(&mut dets, true).unwrap_err();
    assert!(matches!(err, TrackerError::InvalidArgument { .. }));
    assert_eq!(dets[2].track_id, TrackId::NONE);
    assert_eq!(tracker.tracks().count(), 0);
    assert_eq!(tracker.registry().peek_next_id(), TrackId(1));

    let mut dets = vec![det(CAR, [200.0, 200.0, 260.0, 240.0], 0.9)];
    let snap = tracker.byte_track_objects(&mut dets, false).unwrap();
    assert_eq!(dets[0].track_id, TrackId(1));
    assert_eq!(dets[0].track_state, Some(ReportTier::New));
    assert_eq!(snap.get(TrackId(1)).map(|r| r.tier), Some(ReportTier::New));
}

/// Malformed boxes are rejected before any class runs
#[test]
fn test_malformed_box_rejected() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let mut dets = vec![det(PERSON, BOX, 0.9), det(CAR, [50.0, 50.0, 10.0, 10.0], 0.9)];
    let err = tracker.byte_track_objects(&mut dets, false).unwrap_err();
    assert!(matches!(err, TrackerError::InvalidArgument { .. }));
    assert_eq!(tracker.tracks().count(), 0);
    assert_eq!(dets[0].track_id, TrackId::NONE);
}
