/*!
# DeepSORT cascade - class-partitioned multi-object tracking

Frame-by-frame multi-object tracker in the DeepSORT family. Detections are
split by class and, for the ByteTrack-style call, by confidence tier; each
class is then associated independently against its own tracks with a
Kalman motion model, IOU gating and optional appearance features.

## Features

- Class-agnostic face tracking with quality gating
- Multi-class object tracking, single tier or two-tier cascade
- Track lifecycle NEW / UNSTABLE / STABLE with per-class retention
- Snapshot publishing for concurrent readers

## Modules

- [`tracker`] - The [`Tracker`] facade, input adapter, engine and composer
- [`association`] - Cost construction and the two-tier cascade
- [`components`] - Shared algorithms: prediction, update, expiry
- [`types`] - Detections, tracks, configuration and snapshots
- [`reporter`] - Observability callbacks
- [`common`] - Low-level utilities

## Example

```rust
use deepsort_cascade_rs::{ClassId, CornerBox, ObjectDetection, ReportTier, Tracker, TrackerConfig};

let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();

let mut detections = vec![ObjectDetection::new(ClassId(0), CornerBox::new(10.0, 10.0, 50.0, 90.0), 0.9)];
let snapshot = tracker.byte_track_objects(&mut detections, false).unwrap();

assert_eq!(snapshot.len(), 1);
assert_eq!(detections[0].track_state, Some(ReportTier::New));
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Tracker facade and per-call pipeline
pub mod tracker;

/// Core types: detections, tracks, configuration, snapshots
pub mod types;

/// Shared tracking components (prediction, update)
pub mod components;

/// Cost matrices and the two-tier association cascade
pub mod association;

/// Observability callbacks
pub mod reporter;

/// Low-level utilities (geometry, Kalman model, solvers, constants)
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use types::{
    AppearanceConfig, ClassId, ConfidenceTier, FaceDetection, FeatureBlob, FeatureEncoding,
    LifecycleConfig, LifecycleTier, MotionConfig, ObjectDetection, ReportTier, SnapshotRow,
    TierThresholds, Track, TrackId, TrackerConfig, TrackerConfigBuilder, TrackerSnapshot,
};

// Geometry
pub use common::bbox::{BBox, CornerBox};

// Errors
pub use tracker::{ConfigError, TrackerError};

// Solvers
pub use tracker::{Assigner, GreedyAssigner, HungarianAssigner};

// Tracker and publishing
pub use tracker::{PublishedSnapshot, SnapshotReader, Tracker};

// Reporters
pub use reporter::{CompositeReporter, DebugReporter, LoggingReporter, NoOpReporter, StepReporter};

// Scenario generation
pub use common::scenario::{ScenarioConfig, ScenarioFrame, ScenarioGenerator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
