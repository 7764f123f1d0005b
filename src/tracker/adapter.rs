//! Observation Adapter / class partition dispatcher
//!
//! Validates a caller batch, converts detections into [`Observation`]s and
//! splits them by class and confidence tier. Each input slot is recorded in a
//! reverse index so results can be written back in the caller's order.
//!
//! Validation covers the whole batch before anything is partitioned: one bad
//! record fails the batch and nothing reaches the engine.

use std::collections::BTreeMap;

use crate::common::bbox::CornerBox;
use crate::tracker::errors::{reserve_exact, TrackerError};
use crate::types::{
    ClassId, ConfidenceTier, FaceDetection, Feature, FeatureBlob, ObjectDetection, Observation,
    TierThresholds,
};

/// Observations of one class, split by tier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBatch {
    pub class_id: ClassId,
    pub high: Vec<Observation>,
    pub low: Vec<Observation>,
}

impl ClassBatch {
    /// Batch that only ages the class's tracks
    pub fn empty(class_id: ClassId) -> Self {
        Self {
            class_id,
            high: Vec::new(),
            low: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn tier_mut(&mut self, tier: ConfidenceTier) -> &mut Vec<Observation> {
        match tier {
            ConfidenceTier::High => &mut self.high,
            ConfidenceTier::Low => &mut self.low,
        }
    }
}

/// Where an input slot was routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `batches[batch]`, tier list `tier`, index `position`
    Routed {
        batch: usize,
        tier: ConfidenceTier,
        position: usize,
    },
    /// Below the low threshold; never reaches the engine
    Noise,
}

/// A partitioned batch
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// One batch per class, ascending class id
    pub batches: Vec<ClassBatch>,
    /// One entry per input slot
    pub reverse: Vec<Slot>,
}

fn validate_bbox(index: usize, bbox: &CornerBox) -> Result<(), TrackerError> {
    if bbox.is_well_formed() {
        Ok(())
    } else {
        Err(TrackerError::invalid_argument(format!(
            "detection {}: malformed box {:?}",
            index, bbox
        )))
    }
}

fn decode_feature(index: usize, blob: Option<&FeatureBlob>) -> Result<Option<Feature>, TrackerError> {
    blob.map(|b| {
        b.decode().map_err(|e| match e {
            TrackerError::InvalidArgument { context } => {
                TrackerError::invalid_argument(format!("detection {}: {}", index, context))
            }
            other => other,
        })
    })
    .transpose()
}

/// Partition an object batch by class and tier.
///
/// # Arguments
/// * `detections` - Caller batch, in caller order
/// * `thresholds` - Tier split; `None` routes every detection to the high tier
/// * `live_classes` - Classes with live tracks; each gets a batch even without detections
///
/// # Returns
/// The partition, or the first validation error of the batch
pub fn partition_objects<I>(
    detections: &[ObjectDetection],
    thresholds: Option<&TierThresholds>,
    live_classes: I,
) -> Result<Partition, TrackerError>
where
    I: IntoIterator<Item = ClassId>,
{
    // Validate everything first so a bad record yields no partial output
    let mut decoded = Vec::new();
    reserve_exact(&mut decoded, detections.len())?;
    for (i, det) in detections.iter().enumerate() {
        validate_bbox(i, &det.bbox)?;
        if det.class_id == ClassId::AGNOSTIC {
            return Err(TrackerError::invalid_argument(format!(
                "detection {}: class {} is reserved for faces",
                i, det.class_id
            )));
        }
        decoded.push(decode_feature(i, det.feature.as_ref())?);
    }

    let mut by_class: BTreeMap<ClassId, ClassBatch> = BTreeMap::new();
    for class_id in live_classes {
        if class_id != ClassId::AGNOSTIC {
            by_class.entry(class_id).or_insert_with(|| ClassBatch::empty(class_id));
        }
    }

    // Positions are provisional until batch indices are known
    let mut routed: Vec<Option<(ClassId, ConfidenceTier, usize)>> = Vec::new();
    reserve_exact(&mut routed, detections.len())?;
    for (i, (det, feature)) in detections.iter().zip(decoded).enumerate() {
        let tier = match thresholds {
            Some(t) => t.classify(det.score),
            None => Some(ConfidenceTier::High),
        };
        let Some(tier) = tier else {
            routed.push(None);
            continue;
        };
        let batch = by_class
            .entry(det.class_id)
            .or_insert_with(|| ClassBatch::empty(det.class_id));
        let list = batch.tier_mut(tier);
        list.push(Observation::new(det.bbox.to_tlwh(), det.class_id, i).with_feature(feature));
        routed.push(Some((det.class_id, tier, list.len() - 1)));
    }

    let class_index: BTreeMap<ClassId, usize> =
        by_class.keys().enumerate().map(|(i, &c)| (c, i)).collect();
    let reverse = routed
        .into_iter()
        .map(|r| match r {
            Some((class_id, tier, position)) => Slot::Routed {
                batch: class_index[&class_id],
                tier,
                position,
            },
            None => Slot::Noise,
        })
        .collect();

    Ok(Partition {
        batches: by_class.into_values().collect(),
        reverse,
    })
}

/// Partition a face batch into a single class-agnostic, single-tier batch.
///
/// Returns the partition and whether appearance matching may be used: only
/// when every face carries a feature and all features share one non-zero
/// length.
pub fn partition_faces(faces: &[FaceDetection]) -> Result<(Partition, bool), TrackerError> {
    let mut high = Vec::new();
    reserve_exact(&mut high, faces.len())?;
    for (i, face) in faces.iter().enumerate() {
        validate_bbox(i, &face.bbox)?;
        let feature = decode_feature(i, face.feature.as_ref())?;
        high.push(
            Observation::new(face.bbox.to_tlwh(), ClassId::AGNOSTIC, i)
                .with_feature(feature)
                .with_quality(face.quality_weight()),
        );
    }

    let use_reid = match high.first().and_then(|o| o.feature.as_ref()) {
        Some(first) => {
            let dim = first.len();
            dim > 0
                && high
                    .iter()
                    .all(|o| o.feature.as_ref().is_some_and(|f| f.len() == dim))
        }
        None => false,
    };

    let reverse = (0..high.len())
        .map(|position| Slot::Routed {
            batch: 0,
            tier: ConfidenceTier::High,
            position,
        })
        .collect();

    let partition = Partition {
        batches: vec![ClassBatch {
            class_id: ClassId::AGNOSTIC,
            high,
            low: Vec::new(),
        }],
        reverse,
    };
    Ok((partition, use_reid))
}
