//! Core algorithmic components
//!
//! Per-track building blocks used by the association engine:
//!
//! - [`prediction`] - Motion prediction and age bookkeeping
//! - [`update`] - Correction, promotion, misses and retirement

pub mod prediction;
pub mod update;

pub use prediction::{predict_track, predict_tracks};
pub use update::{apply_hit, apply_miss, is_expired};
