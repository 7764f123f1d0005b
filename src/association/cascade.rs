//! Two-tier association cascade
//!
//! Two sequential assignment solves over disjoint observation sets:
//!
//! 1. high-tier observations against every track of the class, with
//!    appearance when the call enables it;
//! 2. low-tier observations against the tracks left over from step 1, on
//!    geometry alone.
//!
//! Step 2 only ever sees tracks step 1 did not claim, so a low-confidence
//! observation can never take a track from a high-confidence one.

use crate::association::cost::build_cost_matrix;
use crate::reporter::StepReporter;
use crate::tracker::traits::Assigner;
use crate::types::{CallConfig, ClassId, ConfidenceTier, Observation, Track};

/// Outcome of one tier's solve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierMatches {
    /// `(track index, observation index)`, track indices into the class's tracks
    pub matches: Vec<(usize, usize)>,
    /// Observation indices left unmatched
    pub unmatched_observations: Vec<usize>,
}

/// Outcome of the whole cascade
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeResult {
    pub high: TierMatches,
    pub low: TierMatches,
    /// Track indices matched in neither tier
    pub unmatched_tracks: Vec<usize>,
}

/// Solve one tier over a subset of tracks
#[allow(clippy::too_many_arguments)]
fn solve_tier<A: Assigner, R: StepReporter>(
    class_id: ClassId,
    tier: ConfidenceTier,
    tracks: &[Track],
    rows: &[usize],
    observations: &[Observation],
    config: &CallConfig,
    use_appearance: bool,
    assigner: &A,
    reporter: &mut R,
) -> TierMatches {
    if observations.is_empty() {
        return TierMatches::default();
    }
    if rows.is_empty() {
        return TierMatches {
            matches: Vec::new(),
            unmatched_observations: (0..observations.len()).collect(),
        };
    }

    let cost = build_cost_matrix(tracks, rows, observations, config, use_appearance);
    reporter.on_cost_matrix(class_id, tier, &cost);

    let result = assigner.assign(&cost);
    let matches: Vec<(usize, usize)> = result
        .assignments
        .iter()
        .filter(|&&(i, j)| cost[(i, j)].is_finite())
        .map(|&(i, j)| (rows[i], j))
        .collect();
    reporter.on_tier_matched(class_id, tier, &matches);

    let mut observation_used = vec![false; observations.len()];
    for &(_, j) in &matches {
        observation_used[j] = true;
    }
    let unmatched_observations = (0..observations.len())
        .filter(|&j| !observation_used[j])
        .collect();

    TierMatches {
        matches,
        unmatched_observations,
    }
}

/// Run the high tier, then the low tier on the remaining tracks
///
/// # Arguments
/// * `class_id` - Class being associated
/// * `tracks` - Predicted tracks of the class
/// * `high` - High-tier observations
/// * `low` - Low-tier observations
/// * `config` - Per-call gates and weights
/// * `assigner` - Assignment solver
/// * `reporter` - Observability hooks
pub fn run_cascade<A: Assigner, R: StepReporter>(
    class_id: ClassId,
    tracks: &[Track],
    high: &[Observation],
    low: &[Observation],
    config: &CallConfig,
    assigner: &A,
    reporter: &mut R,
) -> CascadeResult {
    let all_rows: Vec<usize> = (0..tracks.len()).collect();
    let high_matches = solve_tier(
        class_id,
        ConfidenceTier::High,
        tracks,
        &all_rows,
        high,
        config,
        true,
        assigner,
        reporter,
    );

    let mut track_used = vec![false; tracks.len()];
    for &(t, _) in &high_matches.matches {
        track_used[t] = true;
    }
    let remaining: Vec<usize> = all_rows.into_iter().filter(|&t| !track_used[t]).collect();

    let low_matches = solve_tier(
        class_id,
        ConfidenceTier::Low,
        tracks,
        &remaining,
        low,
        config,
        false,
        assigner,
        reporter,
    );
    for &(t, _) in &low_matches.matches {
        track_used[t] = true;
    }

    CascadeResult {
        high: high_matches,
        low: low_matches,
        unmatched_tracks: (0..tracks.len()).filter(|&t| !track_used[t]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::bbox::BBox;
    use crate::common::linalg::ConstantVelocityModel;
    use crate::reporter::{DebugReporter, NoOpReporter};
    use crate::tracker::traits::HungarianAssigner;
    use crate::types::{MotionConfig, TrackId, TrackerConfig};

    fn tracks(boxes: &[BBox]) -> Vec<Track> {
        let model = ConstantVelocityModel::new(&MotionConfig::default());
        boxes
            .iter()
            .enumerate()
            .map(|(i, b)| Track::new(TrackId(i as u64 + 1), ClassId(0), model.initiate(b), None))
            .collect()
    }

    fn obs(b: BBox) -> Observation {
        Observation::new(b, ClassId(0), 0)
    }

    fn config() -> CallConfig {
        CallConfig::object(&TrackerConfig::default(), ClassId(0), false, None)
    }

    #[test]
    fn test_high_tier_claims_track_before_low() {
        let b = BBox::new(0.0, 0.0, 10.0, 10.0);
        let ts = tracks(&[b]);
        // The low observation fits the track perfectly, the high one only well enough
        let high = [obs(BBox::new(1.0, 1.0, 10.0, 10.0))];
        let low = [obs(b)];
        let r = run_cascade(ClassId(0), &ts, &high, &low, &config(), &HungarianAssigner, &mut NoOpReporter);

        assert_eq!(r.high.matches, vec![(0, 0)]);
        assert!(r.low.matches.is_empty());
        assert_eq!(r.low.unmatched_observations, vec![0]);
        assert!(r.unmatched_tracks.is_empty());
    }

    #[test]
    fn test_low_tier_extends_leftover_tracks() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(50.0, 50.0, 10.0, 10.0);
        let ts = tracks(&[a, b]);
        let high = [obs(a)];
        let low = [obs(b), obs(BBox::new(200.0, 200.0, 5.0, 5.0))];
        let mut reporter = DebugReporter::new();
        let r = run_cascade(ClassId(0), &ts, &high, &low, &config(), &HungarianAssigner, &mut reporter);

        assert_eq!(r.high.matches, vec![(0, 0)]);
        // Low-tier matrix only has the leftover track as its single row
        assert_eq!(reporter.cost_matrix_events()[1].2.dim(), (1, 2));
        assert_eq!(r.low.matches, vec![(1, 0)]);
        assert_eq!(r.low.unmatched_observations, vec![1]);
        assert!(r.unmatched_tracks.is_empty());
    }

    #[test]
    fn test_no_tracks_leaves_everything_unmatched() {
        let high = [obs(BBox::new(0.0, 0.0, 10.0, 10.0))];
        let r = run_cascade(ClassId(0), &[], &high, &[], &config(), &HungarianAssigner, &mut NoOpReporter);
        assert_eq!(r.high.unmatched_observations, vec![0]);
        assert!(r.unmatched_tracks.is_empty());
    }

    #[test]
    fn test_empty_call_leaves_tracks_unmatched() {
        let ts = tracks(&[BBox::new(0.0, 0.0, 10.0, 10.0)]);
        let r = run_cascade(ClassId(0), &ts, &[], &[], &config(), &HungarianAssigner, &mut NoOpReporter);
        assert_eq!(r.unmatched_tracks, vec![0]);
    }
}
