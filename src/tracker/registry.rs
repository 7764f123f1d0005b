//! Track Registry
//!
//! Owns every live track, grouped by class so the engine can borrow one
//! class's tracks mutably while leaving the rest untouched. Identities are
//! allocated from a counter that starts at 1 and never goes back, so an id is
//! never reused, not even after [`TrackRegistry::clear`].

use std::collections::BTreeMap;

use crate::tracker::errors::{reserve_exact, TrackerError};
use crate::types::{ClassId, Track, TrackId};

/// Set of live tracks
#[derive(Debug, Clone)]
pub struct TrackRegistry {
    classes: BTreeMap<ClassId, Vec<Track>>,
    next_id: u64,
}

impl Default for TrackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Hand out the next identity
    pub fn allocate_id(&mut self) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Identity the next created track will receive
    #[inline]
    pub fn peek_next_id(&self) -> TrackId {
        TrackId(self.next_id)
    }

    /// Live tracks of one class
    pub fn tracks(&self, class_id: ClassId) -> &[Track] {
        self.classes.get(&class_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable access to one class's tracks, creating the slot if absent
    pub fn class_mut(&mut self, class_id: ClassId) -> &mut Vec<Track> {
        self.classes.entry(class_id).or_default()
    }

    /// Make room for `additional` tracks of a class without touching its contents
    pub fn reserve(&mut self, class_id: ClassId, additional: usize) -> Result<(), TrackerError> {
        reserve_exact(self.class_mut(class_id), additional)
    }

    /// Add a track under its class
    pub fn insert(&mut self, track: Track) {
        self.class_mut(track.class_id).push(track);
    }

    /// Remove and return the tracks of a class matching `expired`
    pub fn retire_where<F>(&mut self, class_id: ClassId, mut expired: F) -> Vec<Track>
    where
        F: FnMut(&Track) -> bool,
    {
        let Some(tracks) = self.classes.get_mut(&class_id) else {
            return Vec::new();
        };
        let mut retired = Vec::new();
        let mut i = 0;
        while i < tracks.len() {
            if expired(&tracks[i]) {
                retired.push(tracks.remove(i));
            } else {
                i += 1;
            }
        }
        if tracks.is_empty() {
            self.classes.remove(&class_id);
        }
        retired
    }

    /// Classes with at least one live track, in ascending order
    pub fn live_classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(&c, _)| c)
    }

    /// All live tracks, grouped by class
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.classes.values().flatten()
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.iter().find(|t| t.id == id)
    }

    /// Number of live tracks
    pub fn len(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every track; the identity counter keeps running
    pub fn clear(&mut self) {
        self.classes.clear();
    }
}
