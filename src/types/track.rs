//! Track and lifecycle types

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::common::bbox::BBox;
use crate::common::linalg::MotionState;
use crate::types::observation::{ClassId, Feature};

/// Track identity.
///
/// Allocated monotonically from 1 and never reused; 0 means "no identity".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TrackId(pub u64);

impl TrackId {
    /// Reserved "no identity" value
    pub const NONE: TrackId = TrackId(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maturity of a track.
///
/// Tiers only ever advance: NEW -> PROBATION -> ACCREDITATION.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifecycleTier {
    /// Created on the current call
    New,
    /// Survived at least one call, not yet confirmed
    Probation,
    /// Confirmed by a streak of consecutive hits
    Accreditation,
}

/// Appearance gallery; four recent features fit inline
pub type FeatureGallery = SmallVec<[Feature; 4]>;

/// A live track
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    /// Fixed at creation
    pub class_id: ClassId,
    pub motion: MotionState,
    /// Most recent features, oldest first
    pub gallery: FeatureGallery,
    /// Calls since creation, 1 on the creation call
    pub age: u32,
    /// Total matched calls, including creation
    pub hits: u32,
    /// Consecutive matched calls
    pub hit_streak: u32,
    /// Consecutive unmatched calls
    pub time_since_update: u32,
    pub tier: LifecycleTier,
    /// Number of times the track dropped out (matched -> unmatched)
    pub out_count: u32,
}

impl Track {
    /// Create a NEW track from its first observation
    pub fn new(id: TrackId, class_id: ClassId, motion: MotionState, feature: Option<Feature>) -> Self {
        let mut gallery = FeatureGallery::new();
        if let Some(f) = feature {
            gallery.push(f);
        }
        Self {
            id,
            class_id,
            motion,
            gallery,
            age: 1,
            hits: 1,
            hit_streak: 1,
            time_since_update: 0,
            tier: LifecycleTier::New,
            out_count: 0,
        }
    }

    /// Current (predicted or corrected) box
    #[inline]
    pub fn bbox(&self) -> BBox {
        self.motion.bbox()
    }

    /// Add a feature, evicting the oldest beyond `budget`
    pub fn push_feature(&mut self, feature: Feature, budget: usize) {
        if budget == 0 {
            return;
        }
        self.gallery.push(feature);
        while self.gallery.len() > budget {
            self.gallery.remove(0);
        }
    }

    /// Minimum normalised cosine distance between `feature` and the gallery.
    ///
    /// `None` if the gallery is empty or no stored feature shares the
    /// observation's dimension.
    pub fn appearance_distance(&self, feature: &Feature) -> Option<f32> {
        self.gallery
            .iter()
            .filter(|g| g.len() == feature.len())
            .map(|g| cosine_distance(g, feature))
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Cosine distance mapped to `[0, 1]`: 0 for identical direction, 1 for opposite.
///
/// A zero vector is maximally uncertain and yields 0.5.
pub fn cosine_distance(a: &Feature, b: &Feature) -> f32 {
    let na = a.norm();
    let nb = b.norm();
    if na <= f32::EPSILON || nb <= f32::EPSILON {
        return 0.5;
    }
    let cos = (a.dot(b) / (na * nb)).clamp(-1.0, 1.0);
    (1.0 - cos) / 2.0
}
