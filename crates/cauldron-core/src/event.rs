//! Side effects the engine reports back to its host.
//!
//! The engine performs no I/O. Anything the world should react to (items to
//! spawn, block swaps to render, vessels that stopped being tracked) comes
//! back as a [`VesselEvent`] in a [`TickReport`] or an interaction result.

use crate::id::VesselKey;
use crate::item::ItemStack;
use crate::kind::VesselKind;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Why a vessel left the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UntrackReason {
    /// A transform rule asked for it.
    Transform,
    /// The host reported the container is gone.
    Vanished,
    /// Contents were drained or extracted down to nothing.
    Emptied,
    /// Contents were thrown away on purpose.
    Discarded,
}

/// A simulation event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VesselEvent {
    Transformed {
        key: VesselKey,
        from: VesselKind,
        to: VesselKind,
        rule_index: usize,
        tick: u64,
    },
    SpawnItem {
        key: VesselKey,
        stack: ItemStack,
        tick: u64,
    },
    BoilingChanged {
        key: VesselKey,
        boiling: bool,
        tick: u64,
    },
    Untracked {
        key: VesselKey,
        reason: UntrackReason,
        tick: u64,
    },
}

impl VesselEvent {
    pub fn key(&self) -> VesselKey {
        match self {
            VesselEvent::Transformed { key, .. }
            | VesselEvent::SpawnItem { key, .. }
            | VesselEvent::BoilingChanged { key, .. }
            | VesselEvent::Untracked { key, .. } => *key,
        }
    }

    pub fn tick(&self) -> u64 {
        match self {
            VesselEvent::Transformed { tick, .. }
            | VesselEvent::SpawnItem { tick, .. }
            | VesselEvent::BoilingChanged { tick, .. }
            | VesselEvent::Untracked { tick, .. } => *tick,
        }
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// Summary of one [`Engine::tick`](crate::engine::Engine::tick).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Vessels whose thermal step ran.
    pub advanced: usize,
    /// Vessels skipped because their position is not loaded.
    pub skipped_unloaded: usize,
    /// Vessels whose observable state changed this tick.
    pub changed: usize,
    pub events: Vec<VesselEvent>,
}

impl TickReport {
    pub fn spawned_items(&self) -> impl Iterator<Item = (VesselKey, &ItemStack)> {
        self.events.iter().filter_map(|e| match e {
            VesselEvent::SpawnItem { key, stack, .. } => Some((*key, stack)),
            _ => None,
        })
    }

    pub fn untracked(&self) -> impl Iterator<Item = VesselKey> + '_ {
        self.events.iter().filter_map(|e| match e {
            VesselEvent::Untracked { key, .. } => Some(*key),
            _ => None,
        })
    }
}
