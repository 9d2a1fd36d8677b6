//! Authoritative map of tracked vessels.

use crate::dirty::DirtyTracker;
use crate::id::VesselKey;
use crate::vessel::VesselState;
use std::collections::BTreeMap;
use std::collections::btree_map::{Entry, OccupiedEntry};

/// All tracked vessels keyed by position, plus change tracking.
#[derive(Debug, Clone, Default)]
pub struct VesselStateStore {
    vessels: BTreeMap<VesselKey, VesselState>,
    dirty: DirtyTracker,
}

impl VesselStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the record for `key`, creating a default one if absent.
    ///
    /// Only an actual creation marks the store dirty.
    pub fn ensure_tracked(&mut self, key: VesselKey) -> &mut VesselState {
        match self.vessels.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                self.dirty.mark_membership(key);
                e.insert(VesselState::default())
            }
        }
    }

    /// Insert or replace a full record. Always marks dirty.
    pub fn insert(&mut self, key: VesselKey, state: VesselState) -> Option<VesselState> {
        self.dirty.mark_membership(key);
        self.vessels.insert(key, state)
    }

    /// Stop tracking `key`. Only dirties the store if something was removed.
    pub fn untrack(&mut self, key: VesselKey) -> Option<VesselState> {
        let removed = self.vessels.remove(&key);
        if removed.is_some() {
            self.dirty.mark_membership(key);
        }
        removed
    }

    pub fn is_tracked(&self, key: VesselKey) -> bool {
        self.vessels.contains_key(&key)
    }

    pub fn get(&self, key: VesselKey) -> Option<&VesselState> {
        self.vessels.get(&key)
    }

    /// Mutable access. Callers mark the vessel dirty when they change it.
    pub fn get_mut(&mut self, key: VesselKey) -> Option<&mut VesselState> {
        self.vessels.get_mut(&key)
    }

    pub fn mark_dirty(&mut self, key: VesselKey) {
        self.dirty.mark_vessel(key);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty.mark_clean();
    }

    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = VesselKey> + '_ {
        self.vessels.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VesselKey, &VesselState)> {
        self.vessels.iter().map(|(k, v)| (*k, v))
    }

    /// Drop every record and start from `records`. Marks the whole store dirty.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = (VesselKey, VesselState)>) {
        self.vessels = records.into_iter().collect();
        self.dirty.mark_all();
    }

    /// Walk every vessel with the ability to remove the current one.
    ///
    /// The set of keys is captured up front; entries removed during the walk
    /// are skipped, entries added during the walk are not visited.
    pub fn cursor(&mut self) -> VesselCursor<'_> {
        let keys = self.vessels.keys().copied().collect();
        VesselCursor {
            store: self,
            keys,
            pos: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Lending iterator over a [`VesselStateStore`] that tolerates removal.
pub struct VesselCursor<'s> {
    store: &'s mut VesselStateStore,
    keys: Vec<VesselKey>,
    pos: usize,
}

impl VesselCursor<'_> {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<VesselEntry<'_>> {
        let key = loop {
            let key = *self.keys.get(self.pos)?;
            self.pos += 1;
            if self.store.vessels.contains_key(&key) {
                break key;
            }
        };
        let VesselStateStore { vessels, dirty } = &mut *self.store;
        match vessels.entry(key) {
            Entry::Occupied(entry) => Some(VesselEntry { entry, dirty }),
            Entry::Vacant(_) => None,
        }
    }

    /// Keys not yet visited, including ones that may since have been removed.
    pub fn remaining(&self) -> usize {
        self.keys.len() - self.pos
    }
}

/// One vessel under the cursor.
pub struct VesselEntry<'c> {
    entry: OccupiedEntry<'c, VesselKey, VesselState>,
    dirty: &'c mut DirtyTracker,
}

impl VesselEntry<'_> {
    pub fn key(&self) -> VesselKey {
        *self.entry.key()
    }

    pub fn state(&self) -> &VesselState {
        self.entry.get()
    }

    pub fn state_mut(&mut self) -> &mut VesselState {
        self.entry.get_mut()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty.mark_vessel(*self.entry.key());
    }

    /// Remove this vessel from the store. The cursor stays valid.
    pub fn untrack(self) -> VesselState {
        let (key, state) = self.entry.remove_entry();
        self.dirty.mark_membership(key);
        state
    }
}
