//! Read-only query API for inspecting vessel state.
//!
//! Snapshots are owned copies, suitable for status displays and debugging
//! tools. Nothing here references internal engine storage.

use crate::engine::Engine;
use crate::id::{Ident, VesselKey};
use crate::item::ItemStack;
use crate::kind::VesselKind;
use crate::vessel::VesselState;

/// Temperatures at or below this read as [`BrewPhase::Cold`].
pub const COLD_THRESHOLD_C: f32 = 0.0;

/// Coarse, user-facing classification of a vessel.
///
/// Brew state takes precedence over thermal state: a doomed vessel reads as
/// `Doomed` whether or not it is still boiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrewPhase {
    /// Nothing in the vessel.
    Empty,
    /// Contents at rest, or not yet thermally initialized.
    Idle,
    /// At or below freezing.
    Cold,
    Heating,
    Boiling,
    Cooling,
    /// Ingredients recorded, no recipe complete yet.
    Brewing,
    /// A recipe is matched and can be extracted.
    Ready,
    Doomed,
}

impl BrewPhase {
    pub fn of(vessel: &VesselState) -> Self {
        if !vessel.has_contents() {
            return BrewPhase::Empty;
        }
        if vessel.is_doomed() {
            return BrewPhase::Doomed;
        }
        if vessel.matched_recipe_id().is_some() {
            return BrewPhase::Ready;
        }
        if !vessel.ingredients().is_empty() {
            return BrewPhase::Brewing;
        }
        if vessel.boiling {
            return BrewPhase::Boiling;
        }
        if !vessel.is_thermally_initialized() {
            return BrewPhase::Idle;
        }
        if vessel.temp_c <= COLD_THRESHOLD_C {
            return BrewPhase::Cold;
        }
        if vessel.last_temp_c.is_nan() {
            return BrewPhase::Idle;
        }
        if vessel.temp_c > vessel.last_temp_c {
            BrewPhase::Heating
        } else if vessel.temp_c < vessel.last_temp_c {
            BrewPhase::Cooling
        } else {
            BrewPhase::Idle
        }
    }
}

/// An aggregated view of one tracked vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselSnapshot {
    pub key: VesselKey,
    pub kind: VesselKind,
    pub level: u8,
    /// `None` until the vessel is thermally initialized.
    pub temp_c: Option<f32>,
    pub boiling: bool,
    pub phase: BrewPhase,
    pub matched_recipe_id: Option<Ident>,
    /// Sorted by item id.
    pub ingredients: Vec<ItemStack>,
    pub inserted_solid: Option<Ident>,
}

impl VesselSnapshot {
    pub fn from_state(key: VesselKey, vessel: &VesselState) -> Self {
        Self {
            key,
            kind: vessel.kind,
            level: vessel.level,
            temp_c: vessel.is_thermally_initialized().then_some(vessel.temp_c),
            boiling: vessel.boiling,
            phase: BrewPhase::of(vessel),
            matched_recipe_id: vessel.matched_recipe_id().cloned(),
            ingredients: vessel
                .ingredients()
                .iter()
                .map(|(item, &count)| ItemStack::new(item.clone(), count))
                .collect(),
            inserted_solid: vessel.inserted_solid.clone(),
        }
    }
}

impl Engine {
    /// Snapshot one vessel. `None` if the position is not tracked.
    pub fn snapshot(&self, key: VesselKey) -> Option<VesselSnapshot> {
        self.store
            .get(key)
            .map(|vessel| VesselSnapshot::from_state(key, vessel))
    }

    /// Snapshots of every tracked vessel, in key order.
    pub fn snapshot_all(&self) -> Vec<VesselSnapshot> {
        self.store
            .iter()
            .map(|(key, vessel)| VesselSnapshot::from_state(key, vessel))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn water(temp: f32, last: f32) -> VesselState {
        let mut v = VesselState::with_contents(VesselKind::Water, 3);
        v.temp_c = temp;
        v.last_temp_c = last;
        v
    }

    #[test]
    fn thermal_phases() {
        assert_eq!(BrewPhase::of(&VesselState::new()), BrewPhase::Empty);
        assert_eq!(
            BrewPhase::of(&VesselState::with_contents(VesselKind::Water, 3)),
            BrewPhase::Idle
        );
        assert_eq!(BrewPhase::of(&water(-3.0, -2.0)), BrewPhase::Cold);
        assert_eq!(BrewPhase::of(&water(40.0, 35.0)), BrewPhase::Heating);
        assert_eq!(BrewPhase::of(&water(40.0, 45.0)), BrewPhase::Cooling);
        assert_eq!(BrewPhase::of(&water(40.0, 40.0)), BrewPhase::Idle);

        let mut boiling = water(100.0, 100.0);
        boiling.boiling = true;
        assert_eq!(BrewPhase::of(&boiling), BrewPhase::Boiling);
    }

    #[test]
    fn brew_state_wins_over_thermals() {
        let mut v = water(100.0, 95.0);
        v.boiling = true;
        v.add_ingredient(id("sugar"));
        assert_eq!(BrewPhase::of(&v), BrewPhase::Brewing);
        v.set_matched(id("r1"));
        assert_eq!(BrewPhase::of(&v), BrewPhase::Ready);
        v.doom();
        assert_eq!(BrewPhase::of(&v), BrewPhase::Doomed);
    }

    #[test]
    fn engine_snapshot() {
        let mut engine = test_engine();
        assert!(engine.snapshot(key(0)).is_none());
        engine.fill(key(0), VesselKind::Water, Some(2));
        let v = engine.store_mut().get_mut(key(0)).unwrap();
        v.add_ingredient(id("sugar"));
        v.add_ingredient(id("sugar"));

        let snap = engine.snapshot(key(0)).unwrap();
        assert_eq!(snap.level, 2);
        assert_eq!(snap.temp_c, None);
        assert_eq!(snap.phase, BrewPhase::Brewing);
        assert_eq!(snap.ingredients, vec![ItemStack::new(id("sugar"), 2)]);
        assert_eq!(engine.snapshot_all().len(), 1);
    }
}
