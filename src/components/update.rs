//! Per-track bookkeeping after association
//!
//! A matched track is corrected with its observation and may be promoted.
//! An unmatched track accumulates misses and is retired once it has missed
//! more frames than its class tolerates. Tiers only move forward; a track
//! is deleted, never demoted.

use crate::common::linalg::ConstantVelocityModel;
use crate::types::{LifecycleConfig, LifecycleTier, Observation, Track};

/// Apply a matched observation to a track.
///
/// `keep_feature` stores the observation's feature in the gallery; the
/// engine sets it only when appearance matching is enabled for the call.
pub fn apply_hit(
    track: &mut Track,
    observation: &Observation,
    model: &ConstantVelocityModel,
    lifecycle: &LifecycleConfig,
    gallery_budget: usize,
    keep_feature: bool,
) {
    if !model.correct(&mut track.motion, &observation.bbox) {
        log::debug!(
            "Track {}: innovation covariance not positive definite, re-initiated",
            track.id
        );
    }
    if keep_feature {
        if let Some(feature) = &observation.feature {
            track.push_feature(feature.clone(), gallery_budget);
        }
    }

    track.hits = track.hits.saturating_add(1);
    track.hit_streak = track.hit_streak.saturating_add(1);
    track.time_since_update = 0;

    if track.tier == LifecycleTier::Probation && track.hit_streak >= lifecycle.accreditation_hits {
        track.tier = LifecycleTier::Accreditation;
    }
}

/// Record that a track received no observation this call
pub fn apply_miss(track: &mut Track) {
    if track.time_since_update == 0 {
        // matched -> unmatched
        track.out_count = track.out_count.saturating_add(1);
    }
    track.time_since_update = track.time_since_update.saturating_add(1);
    track.hit_streak = 0;
}

/// Whether a track has missed too many consecutive frames to stay alive
#[inline]
pub fn is_expired(track: &Track, lifecycle: &LifecycleConfig) -> bool {
    let limit = if track.tier == LifecycleTier::Accreditation {
        lifecycle.max_age_for(track.class_id)
    } else {
        lifecycle.probation_limit_for(track.class_id)
    };
    track.time_since_update > limit
}
