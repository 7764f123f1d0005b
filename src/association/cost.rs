//! Gated cost matrix construction.
//!
//! Cost between a track and an observation is `1 - IOU`, optionally blended
//! with the appearance distance:
//!
//! ```text
//! c = (1 - λ)(1 - IOU) + λ · d_app
//! ```
//!
//! A pair is infeasible (`f64::INFINITY`) when any gate rejects it:
//! - IOU below the call's gate
//! - observation quality of zero, when quality gating is on
//! - appearance distance above `max_appearance_distance`, when configured
//!
//! Infeasible pairs are non-edges for the assignment solver.

use ndarray::Array2;

use crate::types::{CallConfig, Observation, Track};

/// Cost value marking a pair that must never be matched
pub const INFEASIBLE: f64 = f64::INFINITY;

/// Gated cost of one (track, observation) pair
///
/// # Arguments
/// * `track` - Predicted track
/// * `observation` - Candidate observation
/// * `config` - Per-call gates and weights
/// * `use_appearance` - Blend appearance distance; off for the low tier
#[inline]
pub fn pair_cost(
    track: &Track,
    observation: &Observation,
    config: &CallConfig,
    use_appearance: bool,
) -> f64 {
    if config.quality_gating && observation.quality <= 0.0 {
        return INFEASIBLE;
    }

    let iou = track.bbox().iou(&observation.bbox);
    if iou < config.iou_gate {
        return INFEASIBLE;
    }
    let geometric = 1.0 - iou as f64;

    if !(use_appearance && config.appearance_enabled) {
        return geometric;
    }
    let Some(distance) = observation
        .feature
        .as_ref()
        .and_then(|f| track.appearance_distance(f))
    else {
        return geometric;
    };
    if config
        .max_appearance_distance
        .is_some_and(|max| distance > max)
    {
        return INFEASIBLE;
    }

    let lambda = config.appearance_weight as f64;
    (1.0 - lambda) * geometric + lambda * distance as f64
}

/// Build the cost matrix between a subset of tracks and a set of observations.
///
/// # Arguments
/// * `tracks` - All tracks of the class
/// * `rows` - Indices into `tracks` forming the matrix rows
/// * `observations` - Matrix columns
/// * `config` - Per-call gates and weights
/// * `use_appearance` - Blend appearance distance
///
/// # Returns
/// `rows.len() × observations.len()` matrix with [`INFEASIBLE`] for gated pairs
pub fn build_cost_matrix(
    tracks: &[Track],
    rows: &[usize],
    observations: &[Observation],
    config: &CallConfig,
    use_appearance: bool,
) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), observations.len()), |(i, j)| {
        pair_cost(&tracks[rows[i]], &observations[j], config, use_appearance)
    })
}
