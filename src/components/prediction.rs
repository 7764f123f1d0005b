//! Track prediction
//!
//! Every live track of a class is advanced one step per engine call,
//! whether or not it is matched afterwards.

use crate::common::linalg::ConstantVelocityModel;
use crate::types::{LifecycleTier, Track};

/// Predict a single track forward one frame
///
/// Advances the motion state and the age. A track created on the previous
/// call leaves NEW here, so NEW is only ever seen on the creation call.
#[inline]
pub fn predict_track(track: &mut Track, model: &ConstantVelocityModel) {
    model.predict(&mut track.motion);
    track.age = track.age.saturating_add(1);
    if track.tier == LifecycleTier::New {
        track.tier = LifecycleTier::Probation;
    }
}

/// Predict all tracks of one class
pub fn predict_tracks(tracks: &mut [Track], model: &ConstantVelocityModel) {
    tracks.iter_mut().for_each(|t| predict_track(t, model));
}
