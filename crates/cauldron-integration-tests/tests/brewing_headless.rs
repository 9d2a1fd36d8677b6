//! Headless brewing runs: heat a vessel, brew in it, bottle the result.
//!
//! Drives the engine only through its public surface (fill, tick,
//! interactions, snapshots) against the shared fixture registries.

use std::sync::Arc;

use cauldron_core::config::EngineConfig;
use cauldron_core::engine::Engine;
use cauldron_core::heat::HeatSourceRegistry;
use cauldron_core::id::VesselKey;
use cauldron_core::interaction::{Interaction, Refusal};
use cauldron_core::item::{ItemStack, TagCatalog};
use cauldron_core::kind::VesselKind;
use cauldron_core::matcher::MatchOutcome;
use cauldron_core::query::BrewPhase;
use cauldron_core::recipe::RecipeIndex;
use cauldron_core::registry::Registries;
use cauldron_core::test_utils::*;
use cauldron_core::transform::TransformRuleRegistry;

const AMBIENT: f32 = 20.0;

/// Fill a full water vessel over a campfire and tick until it boils.
fn boiling_vessel(engine: &mut Engine, x: i32) -> (VesselKey, FakeWorld) {
    let k = key(x);
    let world = FakeWorld::new().with_block(k, "campfire");
    assert!(engine.fill(k, VesselKind::Water, Some(3)).is_handled());
    run_ticks(engine, &world, AMBIENT, 20);
    assert!(engine.snapshot(k).unwrap().boiling);
    (k, world)
}

/// Open catalog, no heat, no transforms, boiling not required.
fn engine_with_recipes(recipes: RecipeIndex) -> Engine {
    let registries = Registries::new(
        HeatSourceRegistry::default(),
        TransformRuleRegistry::default(),
        recipes,
        Arc::new(TagCatalog::open()),
    );
    let mut config = EngineConfig::default();
    config.brewing.require_boiling = false;
    Engine::new(Arc::new(registries), config)
}

// ---------------------------------------------------------------------------
// Heating
// ---------------------------------------------------------------------------

#[test]
fn fresh_water_heats_linearly_to_the_source_ceiling() {
    let mut engine = test_engine();
    let k = key(0);
    let world = FakeWorld::new().with_block(k, "campfire");
    engine.fill(k, VesselKind::Water, Some(3));
    assert_eq!(engine.snapshot(k).unwrap().phase, BrewPhase::Idle);

    run_ticks(&mut engine, &world, AMBIENT, 20);
    let snap = engine.snapshot(k).unwrap();
    assert_eq!(snap.temp_c, Some((AMBIENT + 20.0 * 5.0).min(150.0)));
    assert!(snap.boiling);
    assert_eq!(snap.phase, BrewPhase::Boiling);

    run_ticks(&mut engine, &world, AMBIENT, 20);
    assert_eq!(engine.snapshot(k).unwrap().temp_c, Some(150.0));
}

#[test]
fn phase_tracks_direction_of_travel() {
    let mut engine = test_engine();
    let k = key(0);
    let hot = FakeWorld::new().with_block(k, "campfire");
    engine.fill(k, VesselKind::Water, Some(3));

    run_ticks(&mut engine, &hot, AMBIENT, 3);
    assert_eq!(engine.snapshot(k).unwrap().phase, BrewPhase::Heating);

    let cold = FakeWorld::new().with_block(k, "blue_ice");
    run_ticks(&mut engine, &cold, AMBIENT, 1);
    assert_eq!(engine.snapshot(k).unwrap().phase, BrewPhase::Cooling);
}

#[test]
fn unloaded_vessel_is_left_alone() {
    let mut engine = test_engine();
    let k = key(0);
    engine.fill(k, VesselKind::Water, Some(3));
    let mut world = FakeWorld::new().with_block(k, "campfire");
    world.unloaded.insert(k);

    run_ticks(&mut engine, &world, AMBIENT, 10);
    assert_eq!(engine.snapshot(k).unwrap().temp_c, None);
}

// ---------------------------------------------------------------------------
// Brewing
// ---------------------------------------------------------------------------

#[test]
fn brew_swiftness_and_bottle_it() {
    let mut engine = test_engine();
    let (k, world) = boiling_vessel(&mut engine, 0);

    let wart = engine
        .insert_ingredient(k, &id("nether_wart"))
        .handled()
        .unwrap();
    assert_eq!(wart.result.outcome, MatchOutcome::Accepted);
    assert_eq!(engine.snapshot(k).unwrap().phase, BrewPhase::Brewing);

    let sugar = engine.insert_ingredient(k, &id("sugar")).handled().unwrap();
    assert_eq!(sugar.result.outcome, MatchOutcome::Ready);
    assert_eq!(
        sugar.result.matched_recipe_id,
        Some(id("crookedcraft:swiftness"))
    );
    let snap = engine.snapshot(k).unwrap();
    assert_eq!(snap.phase, BrewPhase::Ready);
    assert_eq!(snap.ingredients.len(), 2);

    // Ticking does not disturb a finished brew.
    run_ticks(&mut engine, &world, AMBIENT, 5);
    assert_eq!(engine.snapshot(k).unwrap().phase, BrewPhase::Ready);

    let bottle = engine.extract(k).handled().unwrap();
    assert_eq!(bottle.output, ItemStack::one(id("potion")));
    assert_eq!(bottle.result_variant, Some(id("swiftness")));
    assert_eq!(bottle.level_after, 2);
    assert!(!bottle.untracked);

    let snap = engine.snapshot(k).unwrap();
    assert!(snap.ingredients.is_empty());
    assert_eq!(snap.matched_recipe_id, None);
    assert_eq!(
        engine.extract(k),
        Interaction::NotApplicable(Refusal::NothingToExtract)
    );
}

#[test]
fn last_bottle_untracks_the_vessel() {
    let mut engine = test_engine();
    let (k, _world) = boiling_vessel(&mut engine, 0);
    engine.drain(k, 2);

    engine.insert_ingredient(k, &id("nether_wart"));
    engine.insert_ingredient(k, &id("sugar"));
    let bottle = engine.extract(k).handled().unwrap();
    assert_eq!(bottle.level_after, 0);
    assert!(bottle.untracked);
    assert!(engine.snapshot(k).is_none());
}

#[test]
fn exact_match_then_over_insertion_dooms() {
    let mut recipes = RecipeIndex::builder();
    recipes
        .register(water_recipe(
            "r1",
            vec![item_slot("item_a", 1), item_slot("item_b", 1)],
        ))
        .unwrap()
        .register(water_recipe("r2", vec![item_slot("item_a", 1)]))
        .unwrap();
    let mut engine = engine_with_recipes(recipes.build());
    let k = key(0);
    engine.fill(k, VesselKind::Water, Some(3));

    let first = engine.insert_ingredient(k, &id("item_a")).handled().unwrap();
    assert_eq!(first.result.outcome, MatchOutcome::Ready);
    assert_eq!(first.result.matched_recipe_id, Some(id("r2")));
    assert_eq!(first.result.candidates_after, 2);

    let second = engine.insert_ingredient(k, &id("item_b")).handled().unwrap();
    assert_eq!(second.result.outcome, MatchOutcome::Doomed);
    assert_eq!(second.result.candidates_before, 2);

    let snap = engine.snapshot(k).unwrap();
    assert_eq!(snap.phase, BrewPhase::Doomed);
    assert_eq!(snap.matched_recipe_id, None);
    assert_eq!(
        engine.insert_ingredient(k, &id("item_a")),
        Interaction::NotApplicable(Refusal::Doomed)
    );

    let sludge = engine.extract(k).handled().unwrap();
    assert_eq!(sludge.output, ItemStack::one(id("crookedcraft:doomed_sludge")));
    assert_eq!(sludge.result_variant, None);
}

#[test]
fn irrelevant_item_leaves_the_brew_untouched() {
    let mut engine = test_engine();
    let (k, _world) = boiling_vessel(&mut engine, 0);
    engine.insert_ingredient(k, &id("poppy"));
    let before = engine.store().get(k).unwrap().clone();
    engine.store_mut().mark_clean();

    let res = engine.insert_ingredient(k, &id("iron_nugget"));
    assert_eq!(res.refusal(), Some(&Refusal::NotInAnyRecipe));
    assert_eq!(engine.store().get(k).unwrap(), &before);
    assert!(!engine.store().is_dirty());
}

#[test]
fn unknown_item_is_refused() {
    let mut engine = test_engine();
    let (k, _world) = boiling_vessel(&mut engine, 0);
    let before = engine.snapshot(k).unwrap();

    let res = engine.insert_ingredient(k, &id("stranger"));
    assert_eq!(res.refusal(), Some(&Refusal::NotInAnyRecipe));
    assert_eq!(engine.snapshot(k).unwrap(), before);
}

#[test]
fn ambiguous_recipes_refuse_without_consuming() {
    let mut engine = test_engine();
    let (k, _world) = boiling_vessel(&mut engine, 0);

    let res = engine.insert_ingredient(k, &id("glowstone_dust"));
    assert_eq!(
        res.refusal(),
        Some(&Refusal::Ambiguous { candidates: 2 })
    );
    assert!(engine.snapshot(k).unwrap().ingredients.is_empty());
}

#[test]
fn tag_slots_accept_any_member() {
    let mut engine = test_engine();
    let (k, _world) = boiling_vessel(&mut engine, 0);

    for item in ["poppy", "dandelion"] {
        let res = engine.insert_ingredient(k, &id(item)).handled().unwrap();
        assert_eq!(res.result.outcome, MatchOutcome::Accepted);
    }
    let res = engine.insert_ingredient(k, &id("redstone")).handled().unwrap();
    assert_eq!(res.result.outcome, MatchOutcome::Ready);
    assert_eq!(res.result.matched_recipe_id, Some(id("crookedcraft:bouquet")));
}

#[test]
fn cold_water_does_not_take_ingredients() {
    let mut engine = test_engine();
    let k = key(0);
    engine.fill(k, VesselKind::Water, Some(3));
    run_ticks(&mut engine, &FakeWorld::new(), AMBIENT, 1);

    assert_eq!(
        engine.insert_ingredient(k, &id("nether_wart")).refusal(),
        Some(&Refusal::NotBoiling)
    );
    assert_eq!(
        engine.insert_ingredient(key(9), &id("nether_wart")).refusal(),
        Some(&Refusal::NotTracked)
    );
}

// ---------------------------------------------------------------------------
// Filling and emptying
// ---------------------------------------------------------------------------

#[test]
fn drain_and_discard() {
    let mut engine = test_engine();
    let k = key(0);
    engine.fill(k, VesselKind::Water, Some(3));

    let drained = engine.drain(k, 1).handled().unwrap();
    assert_eq!(drained.level_after, 2);
    assert!(!drained.untracked);

    let drained = engine.drain(k, 5).handled().unwrap();
    assert_eq!(drained.level_after, 0);
    assert!(drained.untracked);
    assert!(!engine.store().is_tracked(k));

    engine.fill(k, VesselKind::Lava, None);
    assert_eq!(engine.discard(k), Interaction::Handled(VesselKind::Lava));
    assert_eq!(engine.discard(k).refusal(), Some(&Refusal::NotTracked));
}

#[test]
fn refill_starts_a_new_batch() {
    let mut engine = test_engine();
    let (k, _world) = boiling_vessel(&mut engine, 0);
    engine.insert_ingredient(k, &id("nether_wart"));
    engine.drain(k, 1);

    let filled = engine.fill(k, VesselKind::Water, None).refusal().cloned();
    assert_eq!(filled, Some(Refusal::AlreadyFull));

    let filled = engine.fill(k, VesselKind::Water, Some(3)).handled().unwrap();
    assert_eq!(filled.level, 3);
    let snap = engine.snapshot(k).unwrap();
    assert_eq!(snap.temp_c, None);
    assert!(snap.ingredients.is_empty());
}

// ---------------------------------------------------------------------------
// Solids
// ---------------------------------------------------------------------------

#[test]
fn solid_slot_rules() {
    let mut engine = test_engine();
    let k = key(0);
    engine.fill(k, VesselKind::Water, Some(3));

    assert_eq!(
        engine.insert_solid(k, &id("sugar")).refusal(),
        Some(&Refusal::NotPlaceable)
    );
    assert_eq!(
        engine.insert_solid(k, &id("gold_block")).refusal(),
        Some(&Refusal::SolidNotWanted)
    );
    assert!(engine.insert_solid(k, &id("iron_block")).is_handled());
    assert_eq!(
        engine.insert_solid(k, &id("iron_block")).refusal(),
        Some(&Refusal::SolidOccupied)
    );

    assert_eq!(
        engine.take_solid(k),
        Interaction::Handled(ItemStack::one(id("iron_block")))
    );
    assert_eq!(engine.take_solid(k).refusal(), Some(&Refusal::NoSolid));
}
