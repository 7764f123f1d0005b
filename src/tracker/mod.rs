//! Tracker facade
//!
//! [`Tracker`] owns the registry and runs the three tracking calls through a
//! single engine:
//!
//! - [`Tracker::track_faces`] - class-agnostic faces, single tier, quality gated
//! - [`Tracker::track_objects`] - multi-class objects, single tier
//! - [`Tracker::byte_track_objects`] - multi-class objects, two-tier cascade
//!
//! Face tracks live under [`ClassId::AGNOSTIC`] and are only touched by face
//! calls; object calls only touch the other classes. Each call returns the
//! snapshot of its own scope and publishes it for concurrent readers.

pub mod adapter;
pub mod composer;
pub mod engine;
pub mod errors;
pub mod publish;
pub mod registry;
pub mod traits;

use std::collections::BTreeSet;

use crate::common::linalg::ConstantVelocityModel;
use crate::reporter::{NoOpReporter, StepReporter};
use crate::types::{
    CallConfig, ClassId, FaceDetection, ObjectDetection, TierThresholds, Track, TrackId,
    TrackerConfig, TrackerSnapshot,
};

pub use adapter::{partition_faces, partition_objects, ClassBatch, Partition, Slot};
pub use composer::{apply_annotations, compose_snapshot, report_tier, resolve_annotations, Annotate, Annotation};
pub use engine::{AssociationEngine, ClassOutcome};
pub use errors::{ConfigError, TrackerError};
pub use publish::{snapshot_channel, PublishedSnapshot, SnapshotPublisher, SnapshotReader};
pub use registry::TrackRegistry;
pub use traits::{Assigner, GreedyAssigner, HungarianAssigner};

use engine::check_feature_dimensions;
use errors::reserve_exact;

/// Multi-object tracker.
///
/// Generic over the reporter `R` receiving observability callbacks and the
/// assignment solver `A`.
///
/// # Type Parameters
///
/// * `R` - Reporter, must implement [`StepReporter`] (default: [`NoOpReporter`])
/// * `A` - Assignment solver, must implement [`Assigner`] (default: [`HungarianAssigner`])
#[derive(Debug)]
pub struct Tracker<R: StepReporter = NoOpReporter, A: Assigner = HungarianAssigner> {
    config: TrackerConfig,
    model: ConstantVelocityModel,
    registry: TrackRegistry,
    assigner: A,
    reporter: R,
    publisher: SnapshotPublisher,
    /// Calls processed so far
    frame: u64,
    /// Classes already warned about for requesting appearance matching
    reid_warned: BTreeSet<ClassId>,
}

impl Tracker<NoOpReporter, HungarianAssigner> {
    /// Create a tracker with the default reporter and solver.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        Self::with_parts(config, NoOpReporter, HungarianAssigner)
    }
}

impl<R: StepReporter> Tracker<R, HungarianAssigner> {
    /// Create a tracker reporting to `reporter`.
    pub fn with_reporter(config: TrackerConfig, reporter: R) -> Result<Self, TrackerError> {
        Self::with_parts(config, reporter, HungarianAssigner)
    }
}

impl<R: StepReporter, A: Assigner> Tracker<R, A> {
    /// Create a tracker from all of its parts.
    pub fn with_parts(config: TrackerConfig, reporter: R, assigner: A) -> Result<Self, TrackerError> {
        config.validate()?;
        let model = ConstantVelocityModel::new(&config.motion);
        Ok(Self {
            config,
            model,
            registry: TrackRegistry::new(),
            assigner,
            reporter,
            publisher: SnapshotPublisher::default(),
            frame: 0,
            reid_warned: BTreeSet::new(),
        })
    }

    /// Track one frame of faces.
    ///
    /// All faces form a single class-agnostic stream with no tier split.
    /// Appearance is used only if every face carries a feature of the same
    /// non-zero length. A face with zero quality, or with a zero pose score,
    /// can start a track but never match one.
    ///
    /// On success every face is annotated with its identity and reporting
    /// tier and the snapshot of all face tracks is returned.
    pub fn track_faces(&mut self, faces: &mut [FaceDetection]) -> Result<TrackerSnapshot, TrackerError> {
        self.frame += 1;

        let (partition, use_reid) = match partition_faces(faces) {
            Ok(p) => p,
            Err(e) => return Err(self.fail(None, e)),
        };
        self.reporter.on_partition(&partition.batches);

        let call = CallConfig::face(&self.config, use_reid);
        let mut outcomes = Vec::new();
        if let Err(e) = reserve_exact(&mut outcomes, partition.batches.len()) {
            return Err(self.fail(None, e));
        }
        let engine = AssociationEngine::new(&self.model, &self.config.lifecycle);
        for batch in &partition.batches {
            match engine.run(&mut self.registry, batch, &call, &self.assigner, &mut self.reporter) {
                Ok(o) => outcomes.push(o),
                Err(e) => {
                    self.reporter.on_error(Some(batch.class_id), &e);
                    return Err(e);
                }
            }
        }

        self.finish(faces, &partition, &outcomes, |t| t.class_id == ClassId::AGNOSTIC)
    }

    /// Track one frame of objects, every detection in the high tier.
    ///
    /// `use_reid` enables appearance matching for the identity-bearing class
    /// only; it is ignored for every other class.
    pub fn track_objects(
        &mut self,
        detections: &mut [ObjectDetection],
        use_reid: bool,
    ) -> Result<TrackerSnapshot, TrackerError> {
        self.run_objects(detections, use_reid, None)
    }

    /// Track one frame of objects with the two-tier cascade.
    ///
    /// Detections scoring at least `thresholds.high` are matched first and
    /// may start tracks; those between `thresholds.low` and `thresholds.high`
    /// may only extend tracks left over; lower scores are ignored.
    pub fn byte_track_objects(
        &mut self,
        detections: &mut [ObjectDetection],
        use_reid: bool,
    ) -> Result<TrackerSnapshot, TrackerError> {
        let thresholds = self.config.thresholds;
        self.run_objects(detections, use_reid, Some(thresholds))
    }

    fn run_objects(
        &mut self,
        detections: &mut [ObjectDetection],
        use_reid: bool,
        thresholds: Option<TierThresholds>,
    ) -> Result<TrackerSnapshot, TrackerError> {
        self.frame += 1;

        let live: Vec<ClassId> = self.registry.live_classes().collect();
        let partition = match partition_objects(detections, thresholds.as_ref(), live) {
            Ok(p) => p,
            Err(e) => return Err(self.fail(None, e)),
        };
        self.reporter.on_partition(&partition.batches);

        let mut calls = Vec::new();
        let mut outcomes = Vec::new();
        let reserved = reserve_exact(&mut calls, partition.batches.len())
            .and_then(|_| reserve_exact(&mut outcomes, partition.batches.len()));
        if let Err(e) = reserved {
            return Err(self.fail(None, e));
        }

        // Validate every class before any of them touches the registry
        for batch in &partition.batches {
            let call = CallConfig::object(&self.config, batch.class_id, use_reid, thresholds);
            if call.appearance_enabled {
                if let Err(e) = check_feature_dimensions(batch.class_id, batch) {
                    return Err(self.fail(Some(batch.class_id), e));
                }
            }
            calls.push(call);
        }

        // Every class runs; the first failure is reported once all are done
        let mut first_error = None;
        let engine = AssociationEngine::new(&self.model, &self.config.lifecycle);
        for (batch, call) in partition.batches.iter().zip(&calls) {
            let class_id = batch.class_id;

            if use_reid && !call.appearance_enabled && self.reid_warned.insert(class_id) {
                log::warn!(
                    "Appearance matching requested for class {}, only class {} carries identity",
                    class_id,
                    self.config.appearance.identity_class
                );
            }

            match engine.run(&mut self.registry, batch, call, &self.assigner, &mut self.reporter) {
                Ok(o) => outcomes.push(o),
                Err(e) => {
                    self.reporter.on_error(Some(class_id), &e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        self.finish(detections, &partition, &outcomes, |t| t.class_id != ClassId::AGNOSTIC)
    }

    /// Compose annotations and snapshot, then write and publish them
    fn finish<D, F>(
        &mut self,
        detections: &mut [D],
        partition: &Partition,
        outcomes: &[ClassOutcome],
        in_scope: F,
    ) -> Result<TrackerSnapshot, TrackerError>
    where
        D: Annotate,
        F: Fn(&Track) -> bool,
    {
        let born: BTreeSet<TrackId> = outcomes.iter().flat_map(|o| o.born.iter().copied()).collect();

        let composed = resolve_annotations(partition, outcomes).and_then(|annotations| {
            let tracks = self.registry.iter().filter(|t| in_scope(t));
            compose_snapshot(self.frame, tracks, &born).map(|s| (annotations, s))
        });
        let (annotations, snapshot) = match composed {
            Ok(c) => c,
            Err(e) => return Err(self.fail(None, e)),
        };

        apply_annotations(detections, &annotations);
        self.reporter.on_snapshot(&snapshot);
        self.publisher.publish(snapshot.clone());
        Ok(snapshot)
    }

    fn fail(&mut self, class_id: Option<ClassId>, error: TrackerError) -> TrackerError {
        self.reporter.on_error(class_id, &error);
        error
    }

    /// Drop every track. Identities keep counting up.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.reid_warned.clear();
    }

    /// A reader of the snapshots this tracker publishes
    pub fn reader(&self) -> SnapshotReader {
        self.publisher.reader()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    /// Live tracks of every class
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.registry.iter()
    }

    /// Calls processed so far, including failed ones
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn assigner(&self) -> &A {
        &self.assigner
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }
}
