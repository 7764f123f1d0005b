//! Output types for tracker results
//!
//! The engine produces one [`ObservationOutcome`] per observation it was
//! given; the composer turns those into in-place annotations and a
//! [`TrackerSnapshot`] with one row per live track.

use serde::{Deserialize, Serialize};

use crate::common::bbox::CornerBox;
use crate::types::observation::ClassId;
use crate::types::track::{LifecycleTier, TrackId};

/// Caller-visible maturity of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportTier {
    /// Created on this call
    New,
    /// Alive but not yet confirmed
    Unstable,
    /// Confirmed
    Stable,
}

impl std::fmt::Display for ReportTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportTier::New => "new",
            ReportTier::Unstable => "unstable",
            ReportTier::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// Resolution of one observation by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationOutcome {
    /// Matched to an existing track
    pub matched: bool,
    /// Spawned a new track
    pub created: bool,
    /// Resolved identity, [`TrackId::NONE`] if discarded
    pub track_id: TrackId,
    /// Lifecycle tier of the resolved track
    pub tier: Option<LifecycleTier>,
    /// Corrected box of the resolved track, or the observation's own box
    pub bbox: CornerBox,
}

impl ObservationOutcome {
    /// Observation that resolved to no track
    pub fn discarded(bbox: CornerBox) -> Self {
        Self {
            matched: false,
            created: false,
            track_id: TrackId::NONE,
            tier: None,
            bbox,
        }
    }

    #[inline]
    pub fn is_assigned(&self) -> bool {
        !self.track_id.is_none()
    }
}

/// One live track as seen by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub track_id: TrackId,
    pub class_id: ClassId,
    pub tier: ReportTier,
    /// Last corrected or predicted box
    pub bbox: CornerBox,
    /// Number of drop-out episodes
    pub out_count: u32,
    pub time_since_update: u32,
}

/// Every live track after a frame, ordered by identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    /// Frames processed so far, including this one
    pub frame: u64,
    pub rows: Vec<SnapshotRow>,
}

impl TrackerSnapshot {
    pub fn empty(frame: u64) -> Self {
        Self {
            frame,
            rows: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row of a given track, if live
    pub fn get(&self, track_id: TrackId) -> Option<&SnapshotRow> {
        self.rows.iter().find(|r| r.track_id == track_id)
    }

    /// Identities in row order
    pub fn track_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.rows.iter().map(|r| r.track_id)
    }
}
