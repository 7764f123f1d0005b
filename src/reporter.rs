//! Observability for tracker execution.
//!
//! This module provides the [`StepReporter`] trait for debugging and
//! instrumentation. Reporters receive callbacks at key points of a tracking
//! call without polluting the association logic.
//!
//! # Zero-Cost Abstraction
//!
//! The default [`NoOpReporter`] compiles to zero overhead - all callback
//! methods are empty and will be optimized away by the compiler.
//!
//! # Example
//!
//! ```
//! use deepsort_cascade_rs::{DebugReporter, Tracker, TrackerConfig};
//!
//! let mut tracker = Tracker::with_reporter(TrackerConfig::default(), DebugReporter::new()).unwrap();
//! tracker.track_objects(&mut [], false).unwrap();
//! assert_eq!(tracker.reporter().snapshot_events().len(), 1);
//! ```

use ndarray::Array2;

use crate::tracker::adapter::ClassBatch;
use crate::tracker::errors::TrackerError;
use crate::types::{ClassId, ConfidenceTier, Track, TrackerSnapshot};

// ============================================================================
// StepReporter Trait
// ============================================================================

/// Observability trait for tracking calls.
///
/// All methods have default empty implementations, so you only need
/// to override the events you care about.
///
/// # Thread Safety
///
/// Reporters use `&mut self` for callbacks, so they are NOT required
/// to be `Send + Sync`.
///
/// # Example
///
/// ```
/// use deepsort_cascade_rs::{StepReporter, Track};
///
/// struct BirthCounter {
///     births: usize,
/// }
///
/// impl StepReporter for BirthCounter {
///     fn on_birth(&mut self, new_tracks: &[Track]) {
///         self.births += new_tracks.len();
///     }
/// }
/// ```
pub trait StepReporter {
    /// Called after a batch has been validated and split by class and tier.
    ///
    /// Includes the empty batches issued for classes with live tracks but no
    /// detections.
    fn on_partition(&mut self, _batches: &[ClassBatch]) {}

    /// Called after a class's tracks have been predicted one step.
    fn on_prediction(&mut self, _class_id: ClassId, _tracks: &[Track]) {}

    /// Called with the gated cost matrix of one tier before it is solved.
    ///
    /// Rows are the candidate tracks, columns the tier's observations;
    /// infeasible pairs are `f64::INFINITY`.
    fn on_cost_matrix(&mut self, _class_id: ClassId, _tier: ConfidenceTier, _cost: &Array2<f64>) {}

    /// Called after a tier is solved, with `(track, observation)` index pairs.
    fn on_tier_matched(
        &mut self,
        _class_id: ClassId,
        _tier: ConfidenceTier,
        _matches: &[(usize, usize)],
    ) {
    }

    /// Called with the tracks created by one class call.
    fn on_birth(&mut self, _new_tracks: &[Track]) {}

    /// Called with the tracks deleted by one class call.
    fn on_retire(&mut self, _retired: &[Track]) {}

    /// Called once the caller-visible snapshot of a frame is composed.
    fn on_snapshot(&mut self, _snapshot: &TrackerSnapshot) {}

    /// Called when a class call or a whole frame fails.
    ///
    /// `class_id` is `None` when the failure concerns the whole batch.
    fn on_error(&mut self, _class_id: Option<ClassId>, _error: &TrackerError) {}
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Zero-cost reporter that does nothing.
///
/// This is the default reporter used when no observability is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub fn new() -> Self {
        Self
    }
}

impl StepReporter for NoOpReporter {
    // All methods use default empty implementations
}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that captures all events for debugging.
///
/// This reporter clones and stores all data passed to callbacks,
/// allowing post-hoc analysis of a run.
///
/// # Memory Usage
///
/// Stores clones of every cost matrix and track passed to it; use it for
/// tests and short diagnostic runs only.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    /// Number of batches per partition event
    partitions: Vec<Vec<(ClassId, usize, usize)>>,

    /// Captured prediction events (class, tracks after prediction)
    predictions: Vec<(ClassId, Vec<Track>)>,

    /// Captured cost matrices
    cost_matrices: Vec<(ClassId, ConfidenceTier, Array2<f64>)>,

    /// Captured per-tier matches
    tier_matches: Vec<(ClassId, ConfidenceTier, Vec<(usize, usize)>)>,

    /// Captured birth events
    births: Vec<Vec<Track>>,

    /// Captured retirement events
    retirements: Vec<Vec<Track>>,

    /// Captured snapshots
    snapshots: Vec<TrackerSnapshot>,

    /// Captured errors
    errors: Vec<(Option<ClassId>, TrackerError)>,
}

impl DebugReporter {
    /// Create a new debug reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.partitions.clear();
        self.predictions.clear();
        self.cost_matrices.clear();
        self.tier_matches.clear();
        self.births.clear();
        self.retirements.clear();
        self.snapshots.clear();
        self.errors.clear();
    }

    /// Captured partitions as `(class, high count, low count)` per batch.
    pub fn partition_events(&self) -> &[Vec<(ClassId, usize, usize)>] {
        &self.partitions
    }

    pub fn prediction_events(&self) -> &[(ClassId, Vec<Track>)] {
        &self.predictions
    }

    pub fn cost_matrix_events(&self) -> &[(ClassId, ConfidenceTier, Array2<f64>)] {
        &self.cost_matrices
    }

    pub fn tier_match_events(&self) -> &[(ClassId, ConfidenceTier, Vec<(usize, usize)>)] {
        &self.tier_matches
    }

    pub fn birth_events(&self) -> &[Vec<Track>] {
        &self.births
    }

    pub fn retirement_events(&self) -> &[Vec<Track>] {
        &self.retirements
    }

    pub fn snapshot_events(&self) -> &[TrackerSnapshot] {
        &self.snapshots
    }

    pub fn error_events(&self) -> &[(Option<ClassId>, TrackerError)] {
        &self.errors
    }

    /// Total number of captured events across all types.
    pub fn total_events(&self) -> usize {
        self.partitions.len()
            + self.predictions.len()
            + self.cost_matrices.len()
            + self.tier_matches.len()
            + self.births.len()
            + self.retirements.len()
            + self.snapshots.len()
            + self.errors.len()
    }
}

impl StepReporter for DebugReporter {
    fn on_partition(&mut self, batches: &[ClassBatch]) {
        self.partitions.push(
            batches
                .iter()
                .map(|b| (b.class_id, b.high.len(), b.low.len()))
                .collect(),
        );
    }

    fn on_prediction(&mut self, class_id: ClassId, tracks: &[Track]) {
        self.predictions.push((class_id, tracks.to_vec()));
    }

    fn on_cost_matrix(&mut self, class_id: ClassId, tier: ConfidenceTier, cost: &Array2<f64>) {
        self.cost_matrices.push((class_id, tier, cost.clone()));
    }

    fn on_tier_matched(&mut self, class_id: ClassId, tier: ConfidenceTier, matches: &[(usize, usize)]) {
        self.tier_matches.push((class_id, tier, matches.to_vec()));
    }

    fn on_birth(&mut self, new_tracks: &[Track]) {
        self.births.push(new_tracks.to_vec());
    }

    fn on_retire(&mut self, retired: &[Track]) {
        self.retirements.push(retired.to_vec());
    }

    fn on_snapshot(&mut self, snapshot: &TrackerSnapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn on_error(&mut self, class_id: Option<ClassId>, error: &TrackerError) {
        self.errors.push((class_id, error.clone()));
    }
}

// ============================================================================
// LoggingReporter
// ============================================================================

/// Reporter that emits events through the `log` crate.
///
/// # Log Levels
///
/// - `on_error`: ERROR
/// - `on_partition`, `on_birth`, `on_retire`, `on_snapshot`: DEBUG
/// - `on_prediction`, `on_cost_matrix`, `on_tier_matched`: TRACE
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    /// Whether to include per-track details in log messages
    verbose: bool,
}

impl LoggingReporter {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a verbose logging reporter that includes track details.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl StepReporter for LoggingReporter {
    fn on_partition(&mut self, batches: &[ClassBatch]) {
        for b in batches {
            log::debug!(
                "Class {}: {} high, {} low observations",
                b.class_id,
                b.high.len(),
                b.low.len()
            );
        }
    }

    fn on_prediction(&mut self, class_id: ClassId, tracks: &[Track]) {
        log::trace!("Class {}: predicted {} tracks", class_id, tracks.len());
        if self.verbose {
            for t in tracks {
                log::trace!(
                    "  Track {}: tier={:?}, age={}, time_since_update={}",
                    t.id,
                    t.tier,
                    t.age,
                    t.time_since_update
                );
            }
        }
    }

    fn on_cost_matrix(&mut self, class_id: ClassId, tier: ConfidenceTier, cost: &Array2<f64>) {
        log::trace!(
            "Class {} {:?} tier: cost matrix {} tracks × {} observations",
            class_id,
            tier,
            cost.nrows(),
            cost.ncols()
        );
    }

    fn on_tier_matched(&mut self, class_id: ClassId, tier: ConfidenceTier, matches: &[(usize, usize)]) {
        log::trace!("Class {} {:?} tier: {} matches", class_id, tier, matches.len());
    }

    fn on_birth(&mut self, new_tracks: &[Track]) {
        if new_tracks.is_empty() {
            return;
        }
        log::debug!("Birth: {} new tracks", new_tracks.len());
        if self.verbose {
            for t in new_tracks {
                log::debug!("  Track {} (class {}) created", t.id, t.class_id);
            }
        }
    }

    fn on_retire(&mut self, retired: &[Track]) {
        if retired.is_empty() {
            return;
        }
        log::debug!("Retired {} tracks", retired.len());
        if self.verbose {
            for t in retired {
                log::debug!(
                    "  Track {} (class {}) retired after {} frames",
                    t.id,
                    t.class_id,
                    t.age
                );
            }
        }
    }

    fn on_snapshot(&mut self, snapshot: &TrackerSnapshot) {
        log::debug!("Frame {}: {} live tracks", snapshot.frame, snapshot.len());
    }

    fn on_error(&mut self, class_id: Option<ClassId>, error: &TrackerError) {
        match class_id {
            Some(c) => log::error!("Class {} call failed: {}", c, error),
            None => log::error!("Frame failed: {}", error),
        }
    }
}

// ============================================================================
// CompositeReporter
// ============================================================================

/// Reporter that forwards events to two child reporters.
///
/// # Example
///
/// ```
/// use deepsort_cascade_rs::{CompositeReporter, DebugReporter, LoggingReporter, StepReporter};
///
/// let mut composite = CompositeReporter::new(DebugReporter::new(), LoggingReporter::new());
/// composite.on_birth(&[]);
/// assert_eq!(composite.first().birth_events().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CompositeReporter<A: StepReporter, B: StepReporter> {
    first: A,
    second: B,
}

impl<A: StepReporter, B: StepReporter> CompositeReporter<A, B> {
    /// Create a new composite reporter.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Get a reference to the first reporter.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Get a mutable reference to the first reporter.
    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    /// Get a reference to the second reporter.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Get a mutable reference to the second reporter.
    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }

    /// Consume and return both reporters.
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: StepReporter, B: StepReporter> StepReporter for CompositeReporter<A, B> {
    fn on_partition(&mut self, batches: &[ClassBatch]) {
        self.first.on_partition(batches);
        self.second.on_partition(batches);
    }

    fn on_prediction(&mut self, class_id: ClassId, tracks: &[Track]) {
        self.first.on_prediction(class_id, tracks);
        self.second.on_prediction(class_id, tracks);
    }

    fn on_cost_matrix(&mut self, class_id: ClassId, tier: ConfidenceTier, cost: &Array2<f64>) {
        self.first.on_cost_matrix(class_id, tier, cost);
        self.second.on_cost_matrix(class_id, tier, cost);
    }

    fn on_tier_matched(&mut self, class_id: ClassId, tier: ConfidenceTier, matches: &[(usize, usize)]) {
        self.first.on_tier_matched(class_id, tier, matches);
        self.second.on_tier_matched(class_id, tier, matches);
    }

    fn on_birth(&mut self, new_tracks: &[Track]) {
        self.first.on_birth(new_tracks);
        self.second.on_birth(new_tracks);
    }

    fn on_retire(&mut self, retired: &[Track]) {
        self.first.on_retire(retired);
        self.second.on_retire(retired);
    }

    fn on_snapshot(&mut self, snapshot: &TrackerSnapshot) {
        self.first.on_snapshot(snapshot);
        self.second.on_snapshot(snapshot);
    }

    fn on_error(&mut self, class_id: Option<ClassId>, error: &TrackerError) {
        self.first.on_error(class_id, error);
        self.second.on_error(class_id, error);
    }
}

// ============================================================================
// Tests
// ============================================================================
