//! Per-Class Association Engine
//!
//! One call resolves one class for one frame:
//!
//! 1. validate the call and reserve every output buffer;
//! 2. predict every live track of the class;
//! 3. run the two-tier cascade;
//! 4. correct matched tracks, age unmatched ones;
//! 5. spawn a NEW track for every unmatched high-tier observation;
//! 6. delete tracks that have missed too many frames.
//!
//! Steps 2-6 cannot fail. Anything that can fail happens in step 1, so a
//! failing call leaves the class's tracks exactly as they were.

use crate::association::cascade::run_cascade;
use crate::common::linalg::ConstantVelocityModel;
use crate::components::{apply_hit, apply_miss, is_expired, predict_tracks};
use crate::reporter::StepReporter;
use crate::tracker::adapter::ClassBatch;
use crate::tracker::errors::{reserve_exact, TrackerError};
use crate::tracker::registry::TrackRegistry;
use crate::tracker::traits::Assigner;
use crate::types::{
    CallConfig, ClassId, LifecycleConfig, LifecycleTier, ObservationOutcome, Observation, Track,
    TrackId,
};

/// Result of one class call
#[derive(Debug, Clone, PartialEq)]
pub struct ClassOutcome {
    pub class_id: ClassId,
    /// One outcome per high-tier observation, in batch order
    pub high: Vec<ObservationOutcome>,
    /// One outcome per low-tier observation, in batch order
    pub low: Vec<ObservationOutcome>,
    /// Identities created by this call
    pub born: Vec<TrackId>,
    /// Identities deleted by this call
    pub retired: Vec<TrackId>,
}

/// Association engine bound to a motion model and lifecycle parameters
#[derive(Debug, Clone, Copy)]
pub struct AssociationEngine<'a> {
    model: &'a ConstantVelocityModel,
    lifecycle: &'a LifecycleConfig,
}

impl<'a> AssociationEngine<'a> {
    pub fn new(model: &'a ConstantVelocityModel, lifecycle: &'a LifecycleConfig) -> Self {
        Self { model, lifecycle }
    }

    /// Process one class batch against the registry
    ///
    /// # Arguments
    /// * `registry` - Live tracks; only `batch.class_id` is touched
    /// * `batch` - The class's high and low observations, possibly empty
    /// * `call` - Gates and weights for this call
    /// * `assigner` - Assignment solver
    /// * `reporter` - Observability hooks
    ///
    /// # Returns
    /// Per-observation outcomes, or an error with the registry untouched
    pub fn run<A: Assigner, R: StepReporter>(
        &self,
        registry: &mut TrackRegistry,
        batch: &ClassBatch,
        call: &CallConfig,
        assigner: &A,
        reporter: &mut R,
    ) -> Result<ClassOutcome, TrackerError> {
        let class_id = batch.class_id;

        if call.appearance_enabled {
            check_feature_dimensions(class_id, batch)?;
        }

        let mut high = Vec::new();
        reserve_exact(&mut high, batch.high.len())?;
        let mut low = Vec::new();
        reserve_exact(&mut low, batch.low.len())?;
        let mut born = Vec::new();
        reserve_exact(&mut born, batch.high.len())?;
        registry.reserve(class_id, batch.high.len())?;

        high.extend(batch.high.iter().map(discarded));
        low.extend(batch.low.iter().map(discarded));

        // ---- predict, associate, update ----
        let unmatched_high = {
            let tracks = registry.class_mut(class_id);
            predict_tracks(tracks, self.model);
            reporter.on_prediction(class_id, tracks);

            let cascade = run_cascade(
                class_id,
                tracks,
                &batch.high,
                &batch.low,
                call,
                assigner,
                reporter,
            );

            for &(t, j) in &cascade.high.matches {
                high[j] = self.hit(&mut tracks[t], &batch.high[j], call);
            }
            for &(t, j) in &cascade.low.matches {
                low[j] = self.hit(&mut tracks[t], &batch.low[j], call);
            }
            for &t in &cascade.unmatched_tracks {
                apply_miss(&mut tracks[t]);
            }

            // Unmatched low-tier observations stay discarded
            cascade.high.unmatched_observations
        };

        // ---- births ----
        let first_new = registry.tracks(class_id).len();
        for j in unmatched_high {
            let observation = &batch.high[j];
            let id = registry.allocate_id();
            let feature = if call.appearance_enabled {
                observation.feature.clone()
            } else {
                None
            };
            let track = Track::new(id, class_id, self.model.initiate(&observation.bbox), feature);
            high[j] = ObservationOutcome {
                matched: false,
                created: true,
                track_id: id,
                tier: Some(LifecycleTier::New),
                bbox: track.bbox().to_corners(),
            };
            born.push(id);
            registry.insert(track);
        }
        let class_tracks = registry.tracks(class_id);
        reporter.on_birth(&class_tracks[first_new.min(class_tracks.len())..]);

        // ---- retirement ----
        let lifecycle = self.lifecycle;
        let retired_tracks = registry.retire_where(class_id, |t| is_expired(t, lifecycle));
        reporter.on_retire(&retired_tracks);
        let retired = retired_tracks.iter().map(|t| t.id).collect();

        Ok(ClassOutcome {
            class_id,
            high,
            low,
            born,
            retired,
        })
    }

    fn hit(&self, track: &mut Track, observation: &Observation, call: &CallConfig) -> ObservationOutcome {
        apply_hit(
            track,
            observation,
            self.model,
            self.lifecycle,
            call.gallery_budget,
            call.appearance_enabled,
        );
        ObservationOutcome {
            matched: true,
            created: false,
            track_id: track.id,
            tier: Some(track.tier),
            bbox: track.bbox().to_corners(),
        }
    }
}

fn discarded(observation: &Observation) -> ObservationOutcome {
    ObservationOutcome::discarded(observation.bbox.to_corners())
}

/// All features offered to one appearance-enabled call must share a length
pub(crate) fn check_feature_dimensions(class_id: ClassId, batch: &ClassBatch) -> Result<(), TrackerError> {
    let mut dims = batch
        .high
        .iter()
        .chain(batch.low.iter())
        .filter_map(|o| o.feature.as_ref().map(|f| (o.source_index, f.len())));

    let Some((_, expected)) = dims.next() else {
        return Ok(());
    };
    match dims.find(|&(_, d)| d != expected) {
        Some((index, d)) => Err(TrackerError::invalid_argument(format!(
            "class {}: detection {} has feature length {}, expected {}",
            class_id, index, d, expected
        ))),
        None => Ok(()),
    }
}
