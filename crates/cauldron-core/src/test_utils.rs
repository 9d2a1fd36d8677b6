//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::config::EngineConfig;
use crate::engine::{Engine, VesselWorld};
use crate::heat::{HeatContact, HeatProfile, HeatSourceRegistry};
use crate::id::{Ident, VesselKey};
use crate::item::{ItemStack, TagCatalog};
use crate::kind::VesselKind;
use crate::recipe::{CountedIngredient, Recipe, RecipeIndex, SlotMatcher};
use crate::registry::Registries;
use crate::transform::{LevelPolicy, ThermalTransform, TransformMode, TransformRuleRegistry};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// ===========================================================================
// Identifiers
// ===========================================================================

/// Parse an identifier, panicking on malformed input.
pub fn id(s: &str) -> Ident {
    Ident::parse(s).unwrap()
}

/// Vessel key on a line along the x axis at y = 64.
pub fn key(x: i32) -> VesselKey {
    VesselKey::from_xyz(x, 64, 0)
}

pub fn item_slot(item: &str, count: u32) -> CountedIngredient {
    CountedIngredient {
        matcher: SlotMatcher::Item(id(item)),
        count,
    }
}

pub fn tag_slot(tag: &str, count: u32) -> CountedIngredient {
    CountedIngredient {
        matcher: SlotMatcher::Tag(id(tag)),
        count,
    }
}

/// A water recipe producing a plain potion.
pub fn water_recipe(name: &str, ingredients: Vec<CountedIngredient>) -> Recipe {
    Recipe::new(id(name), id("water"), ingredients, id("potion"), None).unwrap()
}

// ===========================================================================
// Registries
// ===========================================================================

pub fn test_catalog() -> TagCatalog {
    let mut cat = TagCatalog::new();
    for item in [
        "nether_wart",
        "sugar",
        "glowstone_dust",
        "redstone",
        "potion",
        "iron_nugget",
        "poppy",
        "dandelion",
    ] {
        cat.add_item(id(item));
    }
    for block in ["iron_block", "gold_block", "obsidian"] {
        cat.add_placeable(id(block));
    }
    cat.add_to_tag(id("flowers"), id("poppy"))
        .add_to_tag(id("flowers"), id("dandelion"));
    cat
}

pub fn test_heat_sources() -> HeatSourceRegistry {
    let mut b = HeatSourceRegistry::builder();
    b.register_block(id("campfire"), HeatProfile::new(150.0, 5.0).unwrap())
        .register_block(id("magma_block"), HeatProfile::new(300.0, 10.0).unwrap())
        .register_block(id("blue_ice"), HeatProfile::new(-20.0, 2.0).unwrap())
        .register_fluid(id("lava"), HeatProfile::new(200.0, 8.0).unwrap());
    b.build()
}

/// Freezing, melting, a quench that eats an iron block, and lava setting
/// into obsidian.
pub fn test_transforms() -> TransformRuleRegistry {
    let mut b = TransformRuleRegistry::builder();

    let mut freeze = ThermalTransform::new(TransformMode::Cooling, 0.0, VesselKind::Frozen);
    freeze.level = LevelPolicy::Preserve;
    b.add(VesselKind::Water, freeze).unwrap();

    let mut quench = ThermalTransform::new(TransformMode::Heating, 100.0, VesselKind::Water);
    quench.requires_solid = Some(id("iron_block"));
    quench.consume_solid = true;
    quench.level = LevelPolicy::Preserve;
    quench.drop = Some(ItemStack::new(id("iron_nugget"), 9));
    b.add(VesselKind::Water, quench).unwrap();

    let mut melt = ThermalTransform::new(TransformMode::Heating, 1.0, VesselKind::Water);
    melt.level = LevelPolicy::Preserve;
    b.add(VesselKind::PowderSnow, melt).unwrap();
    b.add(
        VesselKind::Frozen,
        ThermalTransform::new(TransformMode::Heating, 1.0, VesselKind::Water),
    )
    .unwrap();

    let mut set = ThermalTransform::new(TransformMode::Cooling, 900.0, VesselKind::Empty);
    set.drop = Some(ItemStack::new(id("obsidian"), 1));
    set.untrack = true;
    b.add(VesselKind::Lava, set).unwrap();

    b.build()
}

/// Swiftness (nether wart + sugar), two deliberately clashing glowstone
/// recipes, and a flower brew using a tag slot.
pub fn test_recipes() -> RecipeIndex {
    let mut b = RecipeIndex::builder();
    b.register(
        Recipe::new(
            id("crookedcraft:swiftness"),
            id("water"),
            vec![item_slot("nether_wart", 1), item_slot("sugar", 1)],
            id("potion"),
            Some(id("swiftness")),
        )
        .unwrap(),
    )
    .unwrap();
    b.register(water_recipe(
        "crookedcraft:glow_a",
        vec![item_slot("glowstone_dust", 1)],
    ))
    .unwrap();
    b.register(water_recipe(
        "crookedcraft:glow_b",
        vec![item_slot("glowstone_dust", 1)],
    ))
    .unwrap();
    b.register(water_recipe(
        "crookedcraft:bouquet",
        vec![tag_slot("flowers", 2), item_slot("redstone", 1)],
    ))
    .unwrap();
    b.build()
}

pub fn test_registries() -> Arc<Registries> {
    Arc::new(Registries::new(
        test_heat_sources(),
        test_transforms(),
        test_recipes(),
        Arc::new(test_catalog()),
    ))
}

pub fn test_engine() -> Engine {
    Engine::new(test_registries(), EngineConfig::default())
}

// ===========================================================================
// World
// ===========================================================================

/// In-memory [`VesselWorld`]: every position is loaded and present unless
/// listed otherwise.
#[derive(Debug, Clone, Default)]
pub struct FakeWorld {
    pub contacts: BTreeMap<VesselKey, HeatContact>,
    pub gone: BTreeSet<VesselKey>,
    pub unloaded: BTreeSet<VesselKey>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, key: VesselKey, block: &str) -> Self {
        self.contacts.insert(key, HeatContact::block(id(block)));
        self
    }

    pub fn with_fluid(mut self, key: VesselKey, fluid: &str) -> Self {
        self.contacts.insert(key, HeatContact::fluid(id(fluid)));
        self
    }
}

impl VesselWorld for FakeWorld {
    fn is_loaded(&self, key: VesselKey) -> bool {
        !self.unloaded.contains(&key)
    }

    fn vessel_present(&self, key: VesselKey) -> bool {
        !self.gone.contains(&key)
    }

    fn heat_contact(&self, key: VesselKey) -> HeatContact {
        self.contacts.get(&key).cloned().unwrap_or_default()
    }
}

/// Run `ticks` ticks at `ambient_c`.
pub fn run_ticks(engine: &mut Engine, world: &FakeWorld, ambient_c: f32, ticks: u32) {
    for _ in 0..ticks {
        engine.tick(ambient_c, world);
    }
}
