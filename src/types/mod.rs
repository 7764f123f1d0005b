//! Core types for the tracking library
//!
//! # Types
//!
//! - [`ObjectDetection`], [`FaceDetection`] - Caller-facing detection records
//! - [`Observation`] - Internal observation handed to the engine
//! - [`Track`] - Live track with motion state and appearance gallery
//! - [`TrackerConfig`] - Tracker configuration
//! - [`TrackerSnapshot`] - One row per live track after a frame

pub mod config;
pub mod observation;
pub mod output;
pub mod track;

pub use config::{
    AppearanceConfig,
    CallConfig,
    LifecycleConfig,
    MotionConfig,
    TierThresholds,
    TrackerConfig,
    TrackerConfigBuilder,
};

pub use observation::{
    ClassId,
    ConfidenceTier,
    FaceDetection,
    Feature,
    FeatureBlob,
    FeatureEncoding,
    ObjectDetection,
    Observation,
};

pub use output::{
    ObservationOutcome,
    ReportTier,
    SnapshotRow,
    TrackerSnapshot,
};

pub use track::{
    cosine_distance,
    FeatureGallery,
    LifecycleTier,
    Track,
    TrackId,
};
