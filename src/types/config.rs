//! Configuration types for the tracker
//!
//! [`TrackerConfig`] is the long-lived configuration. Every engine call is
//! parameterised by a [`CallConfig`] derived from it, so the face and object
//! entry points share one engine instead of forked code paths.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::constants::*;
use crate::tracker::errors::ConfigError;
use crate::types::observation::{ClassId, ConfidenceTier};

/// Kalman noise parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Position/size noise std, relative to box height
    pub std_weight_position: f64,
    /// Velocity noise std, relative to box height
    pub std_weight_velocity: f64,
    /// Minimum height used for noise scaling
    pub min_noise_extent: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            std_weight_position: DEFAULT_STD_WEIGHT_POSITION,
            std_weight_velocity: DEFAULT_STD_WEIGHT_VELOCITY,
            min_noise_extent: DEFAULT_MIN_NOISE_EXTENT,
        }
    }
}

/// Track lifecycle parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Consecutive hits for PROBATION -> ACCREDITATION
    pub accreditation_hits: u32,
    /// Consecutive misses tolerated before deletion
    pub max_age: u32,
    /// Per-class `max_age` overrides
    pub max_age_per_class: BTreeMap<ClassId, u32>,
    /// Consecutive misses tolerated by a track that is not yet accredited.
    /// `None` means the class's `max_age`.
    pub probation_max_misses: Option<u32>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            accreditation_hits: DEFAULT_ACCREDITATION_HITS,
            max_age: DEFAULT_MAX_AGE,
            max_age_per_class: BTreeMap::new(),
            probation_max_misses: None,
        }
    }
}

impl LifecycleConfig {
    /// Maximum consecutive misses for tracks of `class_id`
    #[inline]
    pub fn max_age_for(&self, class_id: ClassId) -> u32 {
        self.max_age_per_class
            .get(&class_id)
            .copied()
            .unwrap_or(self.max_age)
    }

    /// Maximum consecutive misses for a not-yet-accredited track of `class_id`
    #[inline]
    pub fn probation_limit_for(&self, class_id: ClassId) -> u32 {
        let max_age = self.max_age_for(class_id);
        self.probation_max_misses.map_or(max_age, |m| m.min(max_age))
    }
}

/// Appearance (ReID) matching parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Weight of appearance distance in the blended cost, in `[0, 1]`
    pub appearance_weight: f32,
    /// Pairs with a larger appearance distance are infeasible
    pub max_appearance_distance: Option<f32>,
    /// Features kept per track
    pub gallery_budget: usize,
    /// The only class allowed to use appearance in multi-class mode
    pub identity_class: ClassId,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            appearance_weight: DEFAULT_APPEARANCE_WEIGHT,
            max_appearance_distance: None,
            gallery_budget: DEFAULT_GALLERY_BUDGET,
            identity_class: ClassId(DEFAULT_IDENTITY_CLASS),
        }
    }
}

/// Score thresholds for the two-tier cascade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// `score >= high` is high tier
    pub high: f32,
    /// `low <= score < high` is low tier; below is noise
    pub low: f32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_SCORE,
            low: DEFAULT_LOW_SCORE,
        }
    }
}

impl TierThresholds {
    pub fn new(high: f32, low: f32) -> Self {
        Self { high, low }
    }

    /// Tier of a detection score, `None` if it is noise
    #[inline]
    pub fn classify(&self, score: f32) -> Option<ConfidenceTier> {
        if score >= self.high {
            Some(ConfidenceTier::High)
        } else if score >= self.low {
            Some(ConfidenceTier::Low)
        } else {
            None
        }
    }
}

/// Complete tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub motion: MotionConfig,
    pub lifecycle: LifecycleConfig,
    pub appearance: AppearanceConfig,
    pub thresholds: TierThresholds,
    /// IOU gate for generic objects
    pub iou_gate_object: f32,
    /// IOU gate for faces
    pub iou_gate_face: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            lifecycle: LifecycleConfig::default(),
            appearance: AppearanceConfig::default(),
            thresholds: TierThresholds::default(),
            iou_gate_object: DEFAULT_IOU_GATE_OBJECT,
            iou_gate_face: DEFAULT_IOU_GATE_FACE,
        }
    }
}

impl TrackerConfig {
    /// Create with builder pattern.
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::default()
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            description: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            description: e.to_string(),
        })
    }

    /// Reject parameter combinations the engine cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn unit(field: &'static str, v: f32) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::invalid(field, format!("{} is outside [0, 1]", v)))
            }
        }

        unit("iou_gate_object", self.iou_gate_object)?;
        unit("iou_gate_face", self.iou_gate_face)?;
        unit("appearance.appearance_weight", self.appearance.appearance_weight)?;
        if let Some(d) = self.appearance.max_appearance_distance {
            unit("appearance.max_appearance_distance", d)?;
        }
        if !self.thresholds.low.is_finite() || !self.thresholds.high.is_finite() {
            return Err(ConfigError::invalid("thresholds", "thresholds must be finite"));
        }
        if self.thresholds.low > self.thresholds.high {
            return Err(ConfigError::invalid(
                "thresholds",
                format!(
                    "low {} is above high {}",
                    self.thresholds.low, self.thresholds.high
                ),
            ));
        }
        if self.lifecycle.accreditation_hits < 2 {
            return Err(ConfigError::invalid(
                "lifecycle.accreditation_hits",
                "accreditation needs at least one hit after creation",
            ));
        }
        for (name, v) in [
            ("motion.std_weight_position", self.motion.std_weight_position),
            ("motion.std_weight_velocity", self.motion.std_weight_velocity),
            ("motion.min_noise_extent", self.motion.min_noise_extent),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::invalid(name, format!("{} must be positive", v)));
            }
        }
        Ok(())
    }
}

/// Builder for TrackerConfig.
#[derive(Debug, Default)]
pub struct TrackerConfigBuilder {
    config: TrackerConfig,
}

impl TrackerConfigBuilder {
    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.config.motion = motion;
        self
    }

    pub fn accreditation_hits(mut self, hits: u32) -> Self {
        self.config.lifecycle.accreditation_hits = hits;
        self
    }

    pub fn max_age(mut self, max_age: u32) -> Self {
        self.config.lifecycle.max_age = max_age;
        self
    }

    /// Override `max_age` for one class
    pub fn class_max_age(mut self, class_id: ClassId, max_age: u32) -> Self {
        self.config.lifecycle.max_age_per_class.insert(class_id, max_age);
        self
    }

    pub fn probation_max_misses(mut self, misses: u32) -> Self {
        self.config.lifecycle.probation_max_misses = Some(misses);
        self
    }

    pub fn appearance_weight(mut self, weight: f32) -> Self {
        self.config.appearance.appearance_weight = weight;
        self
    }

    pub fn max_appearance_distance(mut self, distance: f32) -> Self {
        self.config.appearance.max_appearance_distance = Some(distance);
        self
    }

    pub fn gallery_budget(mut self, budget: usize) -> Self {
        self.config.appearance.gallery_budget = budget;
        self
    }

    pub fn identity_class(mut self, class_id: ClassId) -> Self {
        self.config.appearance.identity_class = class_id;
        self
    }

    pub fn thresholds(mut self, high: f32, low: f32) -> Self {
        self.config.thresholds = TierThresholds::new(high, low);
        self
    }

    pub fn iou_gate_object(mut self, gate: f32) -> Self {
        self.config.iou_gate_object = gate;
        self
    }

    pub fn iou_gate_face(mut self, gate: f32) -> Self {
        self.config.iou_gate_face = gate;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<TrackerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parameters of one per-class engine call
#[derive(Debug, Clone, PartialEq)]
pub struct CallConfig {
    /// Pairs below this IOU are infeasible
    pub iou_gate: f32,
    /// Blend appearance distance into the cost
    pub appearance_enabled: bool,
    /// Zero-quality observations cannot match
    pub quality_gating: bool,
    pub appearance_weight: f32,
    pub max_appearance_distance: Option<f32>,
    pub gallery_budget: usize,
    /// Tier split; `None` puts every detection in the high tier
    pub thresholds: Option<TierThresholds>,
}

impl CallConfig {
    /// Object call. Appearance is only honoured for the identity-bearing class.
    pub fn object(
        config: &TrackerConfig,
        class_id: ClassId,
        use_reid: bool,
        thresholds: Option<TierThresholds>,
    ) -> Self {
        Self {
            iou_gate: config.iou_gate_object,
            appearance_enabled: use_reid && class_id == config.appearance.identity_class,
            quality_gating: false,
            appearance_weight: config.appearance.appearance_weight,
            max_appearance_distance: config.appearance.max_appearance_distance,
            gallery_budget: config.appearance.gallery_budget,
            thresholds,
        }
    }

    /// Face call: class-agnostic, single tier, quality-gated
    pub fn face(config: &TrackerConfig, use_reid: bool) -> Self {
        Self {
            iou_gate: config.iou_gate_face,
            appearance_enabled: use_reid,
            quality_gating: true,
            appearance_weight: config.appearance.appearance_weight,
            max_appearance_distance: config.appearance.max_appearance_distance,
            gallery_budget: config.appearance.gallery_budget,
            thresholds: None,
        }
    }
}
