//! Tick driver for the vessel simulation.
//!
//! # Per-vessel pipeline
//!
//! Each call to [`Engine::tick`] walks every tracked vessel once:
//!
//! 1. **Presence** -- unloaded positions are skipped; vanished containers
//!    are untracked.
//! 2. **Thermal** -- resolve the heat contact and advance the temperature.
//! 3. **Transform** -- apply at most one matching rule. A rule that
//!    untracks ends the vessel's pipeline.
//! 4. **Derived flags** -- recompute `boiling` for the (possibly new) kind.
//! 5. **Bookkeeping** -- mark the vessel dirty if anything observable moved.
//!
//! Vessels do not interact, so visiting order carries no meaning.

use crate::config::EngineConfig;
use crate::event::{TickReport, UntrackReason, VesselEvent};
use crate::heat::HeatContact;
use crate::id::{Ident, VesselKey};
use crate::item::ItemStack;
use crate::matcher::{AddResult, IngredientMatcher};
use crate::registry::Registries;
use crate::store::VesselStateStore;
use crate::thermal::ThermalSimulator;
use crate::transform::TransformRuleEngine;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// World seam
// ---------------------------------------------------------------------------

/// What the host world tells the engine about vessel positions.
pub trait VesselWorld {
    /// Whether the position is currently simulated. Unloaded vessels keep
    /// their state untouched.
    fn is_loaded(&self, _key: VesselKey) -> bool {
        true
    }

    /// Whether a container still exists at the position.
    fn vessel_present(&self, key: VesselKey) -> bool;

    /// Fluid and block adjacent to the vessel that may act as heat sources.
    fn heat_contact(&self, key: VesselKey) -> HeatContact;
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Engine {
    pub(crate) store: VesselStateStore,
    pub(crate) registries: Arc<Registries>,
    pub(crate) config: EngineConfig,
    pub(crate) tick: u64,
}

impl Engine {
    pub fn new(registries: Arc<Registries>, config: EngineConfig) -> Self {
        Self {
            store: VesselStateStore::new(),
            registries,
            config,
            tick: 0,
        }
    }

    pub fn store(&self) -> &VesselStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut VesselStateStore {
        &mut self.store
    }

    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    /// Swap in a new registry snapshot. Takes effect from the next call.
    pub fn set_registries(&mut self, registries: Arc<Registries>) {
        self.registries = registries;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Matcher bound to the current recipes and catalog.
    pub fn matcher(&self) -> IngredientMatcher<'_> {
        IngredientMatcher::new(&self.registries.recipes, self.registries.catalog())
    }

    /// Dry-run an ingredient insertion without touching the vessel.
    pub fn preview_ingredient(&self, key: VesselKey, item: &Ident) -> Option<AddResult> {
        let vessel = self.store.get(key)?;
        let liquid = vessel.kind.liquid()?;
        Some(self.matcher().try_add(&liquid, vessel.ingredients(), item))
    }

    /// Advance every tracked vessel by one tick.
    pub fn tick(&mut self, ambient_c: f32, world: &dyn VesselWorld) -> TickReport {
        self.tick += 1;
        let tick = self.tick;
        let registries: &Registries = &self.registries;
        let sim = ThermalSimulator::new(&self.config.thermal);
        let transforms = TransformRuleEngine::new(&registries.transforms, registries.catalog());

        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        let mut cursor = self.store.cursor();
        while let Some(mut entry) = cursor.next() {
            let key = entry.key();
            if !world.is_loaded(key) {
                report.skipped_unloaded += 1;
                continue;
            }
            if !world.vessel_present(key) {
                entry.untrack();
                log::debug!("vessel at {key} vanished; untracked");
                report.changed += 1;
                report.events.push(VesselEvent::Untracked {
                    key,
                    reason: UntrackReason::Vanished,
                    tick,
                });
                continue;
            }

            let heat = registries.heat.resolve(&world.heat_contact(key));
            let state = entry.state_mut();
            let before = state.clone();

            let bonuses = sim.bonuses_for(state.level);
            sim.advance(state, heat, ambient_c, bonuses);
            report.advanced += 1;

            if let Some(outcome) = transforms.try_apply(state) {
                report.events.push(VesselEvent::Transformed {
                    key,
                    from: outcome.from,
                    to: outcome.to,
                    rule_index: outcome.rule_index,
                    tick,
                });
                for stack in outcome.spawned {
                    report
                        .events
                        .push(VesselEvent::SpawnItem { key, stack, tick });
                }
                if outcome.untrack {
                    // A residual solid goes back to the world.
                    if let Some(solid) = entry.untrack().inserted_solid {
                        report.events.push(VesselEvent::SpawnItem {
                            key,
                            stack: ItemStack::one(solid),
                            tick,
                        });
                    }
                    report.changed += 1;
                    report.events.push(VesselEvent::Untracked {
                        key,
                        reason: UntrackReason::Transform,
                        tick,
                    });
                    continue;
                }
            }

            let state = entry.state_mut();
            state.boiling = sim.is_boiling(state, heat, sim.bonuses_for(state.level));
            if state.boiling != before.boiling {
                report.events.push(VesselEvent::BoilingChanged {
                    key,
                    boiling: state.boiling,
                    tick,
                });
            }
            if *state != before {
                entry.mark_dirty();
                report.changed += 1;
            }
        }

        report
    }
}
