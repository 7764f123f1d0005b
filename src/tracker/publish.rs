//! Single-writer / multi-reader snapshot publishing
//!
//! The tracker composes each snapshot privately and then swaps an `Arc` to
//! it under a short write lock. Readers clone the `Arc` under the read lock
//! and keep a complete, immutable snapshot for as long as they need it, so a
//! render thread never sees a half-written frame and never holds the lock
//! while drawing.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::TrackerSnapshot;

/// A published snapshot with its publication sequence number
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishedSnapshot {
    /// 0 before anything is published, then 1, 2, ...
    pub sequence: u64,
    pub snapshot: TrackerSnapshot,
}

#[derive(Debug, Default)]
struct Slot {
    current: RwLock<Arc<PublishedSnapshot>>,
}

/// Writing half; owned by the tracker
#[derive(Debug)]
pub struct SnapshotPublisher {
    slot: Arc<Slot>,
    sequence: u64,
}

/// Reading half; cheap to clone and `Send + Sync`
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    slot: Arc<Slot>,
}

/// Create a connected publisher/reader pair
pub fn snapshot_channel() -> (SnapshotPublisher, SnapshotReader) {
    let slot = Arc::new(Slot::default());
    (
        SnapshotPublisher {
            slot: Arc::clone(&slot),
            sequence: 0,
        },
        SnapshotReader { slot },
    )
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        snapshot_channel().0
    }
}

impl SnapshotPublisher {
    /// Publish a fully composed snapshot, returning its sequence number
    pub fn publish(&mut self, snapshot: TrackerSnapshot) -> u64 {
        self.sequence += 1;
        let published = Arc::new(PublishedSnapshot {
            sequence: self.sequence,
            snapshot,
        });
        *self.slot.current.write() = published;
        self.sequence
    }

    /// Another reader of this publisher
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Sequence number of the last publication
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl SnapshotReader {
    /// Most recently published snapshot
    pub fn latest(&self) -> Arc<PublishedSnapshot> {
        Arc::clone(&self.slot.current.read())
    }

    /// Sequence number of the most recent publication
    pub fn sequence(&self) -> u64 {
        self.slot.current.read().sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sees_latest() {
        let (mut publisher, reader) = snapshot_channel();
        assert_eq!(reader.latest().sequence, 0);
        assert!(reader.latest().snapshot.is_empty());

        publisher.publish(TrackerSnapshot::empty(1));
        let held = reader.latest();
        publisher.publish(TrackerSnapshot::empty(2));

        // A held snapshot is unaffected by later publications
        assert_eq!(held.snapshot.frame, 1);
        assert_eq!(reader.latest().snapshot.frame, 2);
        assert_eq!(reader.sequence(), 2);
        assert_eq!(publisher.reader().sequence(), publisher.sequence());
    }
}
