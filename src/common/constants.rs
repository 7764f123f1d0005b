//! Numerical defaults and tolerances
//!
//! Defaults are configuration starting points, not tuned vendor constants.
//! Every one of them can be overridden through [`crate::TrackerConfig`].

/// IOU gate used for generic objects.
pub const DEFAULT_IOU_GATE_OBJECT: f32 = 0.3;

/// IOU gate used for faces.
///
/// Faces are small and move fast relative to their size, hence the looser gate.
pub const DEFAULT_IOU_GATE_FACE: f32 = 0.1;

/// Detections scoring at or above this are high tier.
pub const DEFAULT_HIGH_SCORE: f32 = 0.5;

/// Detections scoring below this are discarded as noise.
pub const DEFAULT_LOW_SCORE: f32 = 0.1;

/// Consecutive hits needed for PROBATION -> ACCREDITATION.
pub const DEFAULT_ACCREDITATION_HITS: u32 = 3;

/// Consecutive misses after which a track is deleted.
pub const DEFAULT_MAX_AGE: u32 = 30;

/// Weight of the appearance distance in the blended cost.
pub const DEFAULT_APPEARANCE_WEIGHT: f32 = 0.5;

/// Number of recent features kept in a track's appearance gallery.
pub const DEFAULT_GALLERY_BUDGET: usize = 4;

/// Class allowed to use appearance matching in multi-class mode (person).
pub const DEFAULT_IDENTITY_CLASS: i32 = 0;

/// Kalman position noise, relative to box height.
pub const DEFAULT_STD_WEIGHT_POSITION: f64 = 1.0 / 20.0;

/// Kalman velocity noise, relative to box height.
pub const DEFAULT_STD_WEIGHT_VELOCITY: f64 = 1.0 / 160.0;

/// Lower bound on the extent used to scale Kalman noise.
///
/// Keeps covariances positive definite for degenerate boxes.
pub const DEFAULT_MIN_NOISE_EXTENT: f64 = 1.0;

/// Tolerance for treating a reduced Hungarian cost as zero.
pub const HUNGARIAN_ZERO_TOLERANCE: f64 = 1e-9;
