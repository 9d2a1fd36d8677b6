//! Cauldron Core -- the vessel simulation engine.
//!
//! Vessels are containers that hold a fluid (or snow, or ice), a temperature,
//! an optional resident solid and a brew in progress. This crate owns their
//! state and advances it: temperatures approach whatever heat source the
//! host reports, configured rules swap kinds when thresholds are crossed,
//! and ingredients dropped into a boiling vessel are matched against
//! recipes.
//!
//! The engine performs no I/O and looks up no world geometry. The host
//! drives it once per tick through [`engine::VesselWorld`] and calls the
//! interaction methods on [`engine::Engine`] in between.
//!
//! # Tick Pipeline
//!
//! For every tracked vessel, in order:
//!
//! 1. **Presence** -- skip unloaded positions, untrack vanished ones.
//! 2. **Thermal** -- [`thermal::ThermalSimulator`] steps the temperature.
//! 3. **Transform** -- [`transform::TransformRuleEngine`] applies at most one
//!    rule; a rule may untrack the vessel.
//! 4. **Derived flags** -- `boiling` is recomputed.
//! 5. **Bookkeeping** -- changed vessels are marked dirty.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Tick driver, interactions, queries and persistence.
//! - [`store::VesselStateStore`] -- Tracked vessels with removal-safe walking.
//! - [`matcher::IngredientMatcher`] -- Backtracking recipe matcher.
//! - [`registry::Registries`] -- Immutable heat, transform, recipe and item
//!   registries, swapped atomically on reload.
//! - [`config::EngineConfig`] -- Tunable constants.
//! - [`serialize`] -- JSON records and versioned bitcode snapshots.

pub mod config;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod dirty;
pub mod engine;
pub mod event;
pub mod heat;
pub mod id;
pub mod interaction;
pub mod item;
pub mod kind;
pub mod matcher;
pub mod query;
pub mod recipe;
pub mod registry;
pub mod serialize;
pub mod store;
pub mod thermal;
pub mod transform;
pub mod vessel;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
