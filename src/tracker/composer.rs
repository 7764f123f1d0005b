//! Result Composer
//!
//! Maps engine outcomes back to the caller: per-detection annotations in the
//! caller's original order, and a snapshot with one row per live track.
//! Everything is resolved into owned buffers first and only then written, so
//! a failure never leaves the caller's detections half annotated.

use std::collections::BTreeSet;

use crate::tracker::adapter::{Partition, Slot};
use crate::tracker::engine::ClassOutcome;
use crate::tracker::errors::{reserve_exact, TrackerError};
use crate::types::{
    ConfidenceTier, FaceDetection, LifecycleTier, ObjectDetection, ReportTier, SnapshotRow, Track,
    TrackId, TrackerSnapshot,
};

/// Translate a lifecycle tier to its reporting tier.
///
/// NEW is only reportable on the call that created the track; seeing it on
/// any other track means the lifecycle was not advanced and is an error.
pub fn report_tier(
    track_id: TrackId,
    tier: LifecycleTier,
    created_this_call: bool,
) -> Result<ReportTier, TrackerError> {
    match tier {
        LifecycleTier::New if created_this_call => Ok(ReportTier::New),
        LifecycleTier::New => Err(TrackerError::internal_consistency(
            track_id,
            "NEW tier on a track not created by this call",
        )),
        LifecycleTier::Probation => Ok(ReportTier::Unstable),
        LifecycleTier::Accreditation => Ok(ReportTier::Stable),
    }
}

/// Identity and reporting tier for one input slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Annotation {
    pub track_id: TrackId,
    pub track_state: Option<ReportTier>,
}

/// Detection records the composer can write back into
pub trait Annotate {
    fn annotate(&mut self, annotation: &Annotation);
}

impl Annotate for ObjectDetection {
    fn annotate(&mut self, annotation: &Annotation) {
        self.track_id = annotation.track_id;
        self.track_state = annotation.track_state;
    }
}

impl Annotate for FaceDetection {
    fn annotate(&mut self, annotation: &Annotation) {
        self.track_id = annotation.track_id;
        self.track_state = annotation.track_state;
    }
}

/// Resolve one annotation per input slot by walking the reverse index.
///
/// `outcomes` is aligned with `partition.batches`. Noise and discarded
/// observations resolve to [`TrackId::NONE`].
pub fn resolve_annotations(
    partition: &Partition,
    outcomes: &[ClassOutcome],
) -> Result<Vec<Annotation>, TrackerError> {
    let mut annotations = Vec::new();
    reserve_exact(&mut annotations, partition.reverse.len())?;

    for slot in &partition.reverse {
        let Slot::Routed {
            batch,
            tier,
            position,
        } = *slot
        else {
            annotations.push(Annotation::default());
            continue;
        };

        let outcome = outcomes.get(batch).and_then(|o| match tier {
            ConfidenceTier::High => o.high.get(position),
            ConfidenceTier::Low => o.low.get(position),
        });
        let Some(outcome) = outcome else {
            return Err(TrackerError::internal_consistency(
                TrackId::NONE,
                format!("no outcome for batch {} {:?} position {}", batch, tier, position),
            ));
        };

        let annotation = match outcome.tier {
            Some(t) if outcome.is_assigned() => Annotation {
                track_id: outcome.track_id,
                track_state: Some(report_tier(outcome.track_id, t, outcome.created)?),
            },
            _ => Annotation::default(),
        };
        annotations.push(annotation);
    }
    Ok(annotations)
}

/// Write resolved annotations into the caller's records, slot for slot
pub fn apply_annotations<D: Annotate>(detections: &mut [D], annotations: &[Annotation]) {
    for (d, a) in detections.iter_mut().zip(annotations) {
        d.annotate(a);
    }
}

/// Compose the snapshot of a set of live tracks, ordered by identity
///
/// # Arguments
/// * `frame` - Frame counter to stamp on the snapshot
/// * `tracks` - Live tracks in scope
/// * `born` - Identities created by this call
pub fn compose_snapshot<'t, I>(
    frame: u64,
    tracks: I,
    born: &BTreeSet<TrackId>,
) -> Result<TrackerSnapshot, TrackerError>
where
    I: IntoIterator<Item = &'t Track>,
{
    let tracks: Vec<&Track> = tracks.into_iter().collect();
    let mut rows = Vec::new();
    reserve_exact(&mut rows, tracks.len())?;

    for t in tracks {
        rows.push(SnapshotRow {
            track_id: t.id,
            class_id: t.class_id,
            tier: report_tier(t.id, t.tier, born.contains(&t.id))?,
            bbox: t.bbox().to_corners(),
            out_count: t.out_count,
            time_since_update: t.time_since_update,
        });
    }
    rows.sort_unstable_by_key(|r| r.track_id);

    Ok(TrackerSnapshot { frame, rows })
}
