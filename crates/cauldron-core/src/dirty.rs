use crate::id::VesselKey;
use std::collections::BTreeSet;

/// Tracks which vessels changed since the last save point.
///
/// The host uses [`is_dirty`](DirtyTracker::is_dirty) to decide whether the
/// store needs persisting, then calls [`mark_clean`](DirtyTracker::mark_clean).
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_vessels: BTreeSet<VesselKey>,
    membership_dirty: bool,
    any_dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A vessel's fields changed.
    pub fn mark_vessel(&mut self, key: VesselKey) {
        self.dirty_vessels.insert(key);
        self.any_dirty = true;
    }

    /// A vessel started or stopped being tracked.
    pub fn mark_membership(&mut self, key: VesselKey) {
        self.dirty_vessels.insert(key);
        self.membership_dirty = true;
        self.any_dirty = true;
    }

    /// Something changed that is not tied to one vessel (e.g. a bulk load).
    pub fn mark_all(&mut self) {
        self.membership_dirty = true;
        self.any_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.any_dirty
    }

    pub fn is_vessel_dirty(&self, key: VesselKey) -> bool {
        self.dirty_vessels.contains(&key)
    }

    pub fn is_membership_dirty(&self) -> bool {
        self.membership_dirty
    }

    pub fn dirty_vessels(&self) -> &BTreeSet<VesselKey> {
        &self.dirty_vessels
    }

    pub fn mark_clean(&mut self) {
        self.dirty_vessels.clear();
        self.membership_dirty = false;
        self.any_dirty = false;
    }
}
