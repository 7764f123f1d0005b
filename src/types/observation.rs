//! Detection records and internal observations
//!
//! Callers hand the tracker [`ObjectDetection`] or [`FaceDetection`] batches.
//! The observation adapter turns them into [`Observation`]s, the only form the
//! association engine sees.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::common::bbox::{BBox, CornerBox};
use crate::tracker::errors::TrackerError;
use crate::types::output::ReportTier;
use crate::types::track::TrackId;

/// Detector class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub i32);

impl ClassId {
    /// Implicit class used when tracking is class-agnostic (faces)
    pub const AGNOSTIC: ClassId = ClassId(-1);
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::AGNOSTIC {
            write!(f, "agnostic")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Appearance feature vector
pub type Feature = DVector<f32>;

/// Element encoding of a packed feature blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureEncoding {
    Int8,
    Uint8,
    Int16,
    Float32,
}

impl FeatureEncoding {
    /// Bytes per element
    #[inline]
    pub fn element_size(self) -> usize {
        match self {
            FeatureEncoding::Int8 | FeatureEncoding::Uint8 => 1,
            FeatureEncoding::Int16 => 2,
            FeatureEncoding::Float32 => 4,
        }
    }
}

/// Packed appearance feature as emitted by the feature extractor.
///
/// Element `d` starts at byte `d * stride`. Only [`FeatureEncoding::Int8`]
/// is supported; anything else is rejected when the batch is adapted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBlob {
    pub encoding: FeatureEncoding,
    pub data: Vec<u8>,
    /// Number of elements
    pub len: usize,
    /// Byte distance between consecutive elements
    pub stride: usize,
}

impl FeatureBlob {
    /// Densely packed int8 feature
    pub fn int8(values: &[i8]) -> Self {
        Self {
            encoding: FeatureEncoding::Int8,
            data: values.iter().map(|&v| v as u8).collect(),
            len: values.len(),
            stride: 1,
        }
    }

    /// Check encoding and layout without decoding
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.encoding != FeatureEncoding::Int8 {
            return Err(TrackerError::invalid_argument(format!(
                "feature encoding {:?} not supported, expected Int8",
                self.encoding
            )));
        }
        if self.len > 0 && self.stride < self.encoding.element_size() {
            return Err(TrackerError::invalid_argument(format!(
                "feature stride {} smaller than element size {}",
                self.stride,
                self.encoding.element_size()
            )));
        }
        let required = self.len.checked_mul(self.stride).ok_or_else(|| {
            TrackerError::invalid_argument("feature length overflows buffer size".to_string())
        })?;
        if self.data.len() < required {
            return Err(TrackerError::invalid_argument(format!(
                "feature buffer holds {} bytes, {} elements with stride {} need {}",
                self.data.len(),
                self.len,
                self.stride,
                required
            )));
        }
        Ok(())
    }

    /// Validate and decode to a float feature
    pub fn decode(&self) -> Result<Feature, TrackerError> {
        self.validate()?;
        Ok(Feature::from_iterator(
            self.len,
            (0..self.len).map(|d| self.data[d * self.stride] as i8 as f32),
        ))
    }
}

/// One detection in a multi-class object batch.
///
/// `track_id` and `track_state` are written back by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDetection {
    pub class_id: ClassId,
    pub bbox: CornerBox,
    pub score: f32,
    pub feature: Option<FeatureBlob>,
    /// Resolved identity, [`TrackId::NONE`] if unassigned
    pub track_id: TrackId,
    /// Reporting tier, `None` if unassigned
    pub track_state: Option<ReportTier>,
}

impl ObjectDetection {
    /// Create a detection without appearance feature
    pub fn new(class_id: ClassId, bbox: CornerBox, score: f32) -> Self {
        Self {
            class_id,
            bbox,
            score,
            feature: None,
            track_id: TrackId::NONE,
            track_state: None,
        }
    }

    /// Attach an appearance feature
    pub fn with_feature(mut self, feature: FeatureBlob) -> Self {
        self.feature = Some(feature);
        self
    }
}

/// One detection in a face batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetection {
    pub bbox: CornerBox,
    pub score: f32,
    pub feature: Option<FeatureBlob>,
    /// Face quality in `[0, 1]`
    pub face_quality: f32,
    /// Head-pose score; 0 marks an unusable pose
    pub pose_score: f32,
    pub track_id: TrackId,
    pub track_state: Option<ReportTier>,
}

impl FaceDetection {
    /// Create a face with full quality and no feature
    pub fn new(bbox: CornerBox, score: f32) -> Self {
        Self {
            bbox,
            score,
            feature: None,
            face_quality: 1.0,
            pose_score: 1.0,
            track_id: TrackId::NONE,
            track_state: None,
        }
    }

    pub fn with_feature(mut self, feature: FeatureBlob) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn with_quality(mut self, face_quality: f32, pose_score: f32) -> Self {
        self.face_quality = face_quality;
        self.pose_score = pose_score;
        self
    }

    /// Quality weight used for gating: zero when the pose is unusable
    #[inline]
    pub fn quality_weight(&self) -> f32 {
        if self.pose_score == 0.0 {
            0.0
        } else {
            self.face_quality
        }
    }
}

/// Confidence tier of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceTier {
    High,
    Low,
}

/// Internal observation record handed to the association engine
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Box in top-left/width/height form
    pub bbox: BBox,
    pub feature: Option<Feature>,
    /// Quality weight, 1.0 unless supplied by the face variant
    pub quality: f32,
    pub class_id: ClassId,
    /// Position in the caller's batch
    pub source_index: usize,
}

impl Observation {
    pub fn new(bbox: BBox, class_id: ClassId, source_index: usize) -> Self {
        Self {
            bbox,
            feature: None,
            quality: 1.0,
            class_id,
            source_index,
        }
    }

    pub fn with_feature(mut self, feature: Option<Feature>) -> Self {
        self.feature = feature;
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }
}
