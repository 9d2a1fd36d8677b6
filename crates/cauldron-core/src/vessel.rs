//! Per-vessel simulation record.

use crate::id::Ident;
use crate::kind::VesselKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the engine knows about one tracked vessel.
///
/// `temp_c` is `NaN` exactly when the vessel has not been thermally
/// initialized yet. `doomed` and `matched_recipe_id` are never both set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselState {
    pub kind: VesselKind,
    pub level: u8,
    pub temp_c: f32,
    pub last_temp_c: f32,
    pub boiling: bool,
    doomed: bool,
    matched_recipe_id: Option<Ident>,
    ingredients: BTreeMap<Ident, u32>,
    pub inserted_solid: Option<Ident>,
}

impl Default for VesselState {
    fn default() -> Self {
        Self {
            kind: VesselKind::Empty,
            level: 0,
            temp_c: f32::NAN,
            last_temp_c: f32::NAN,
            boiling: false,
            doomed: false,
            matched_recipe_id: None,
            ingredients: BTreeMap::new(),
            inserted_solid: None,
        }
    }
}

impl VesselState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A vessel of `kind` at `level`, not yet thermally initialized.
    pub fn with_contents(kind: VesselKind, level: u8) -> Self {
        Self {
            kind,
            level: kind.clamp_level(level),
            ..Self::default()
        }
    }

    pub fn is_thermally_initialized(&self) -> bool {
        !self.temp_c.is_nan()
    }

    /// Forget the current temperature so the next tick re-seeds it.
    pub fn reset_thermals(&mut self) {
        self.temp_c = f32::NAN;
        self.last_temp_c = f32::NAN;
        self.boiling = false;
    }

    /// True when the vessel holds a fluid or snow at a non-zero level.
    pub fn has_contents(&self) -> bool {
        self.kind != VesselKind::Empty && self.level > 0
    }

    // -----------------------------------------------------------------------
    // Brew state
    // -----------------------------------------------------------------------

    pub fn is_doomed(&self) -> bool {
        self.doomed
    }

    pub fn matched_recipe_id(&self) -> Option<&Ident> {
        self.matched_recipe_id.as_ref()
    }

    pub fn ingredients(&self) -> &BTreeMap<Ident, u32> {
        &self.ingredients
    }

    pub fn ingredient_total(&self) -> u32 {
        self.ingredients.values().sum()
    }

    /// Record one more unit of `item`.
    pub fn add_ingredient(&mut self, item: Ident) {
        *self.ingredients.entry(item).or_insert(0) += 1;
    }

    /// Replace the ingredient map, dropping zero counts.
    pub fn set_ingredients(&mut self, ingredients: BTreeMap<Ident, u32>) {
        self.ingredients = ingredients;
        self.ingredients.retain(|_, count| *count > 0);
    }

    /// Mark the brew as failed. Clears the recorded match and ingredients.
    pub fn doom(&mut self) {
        self.doomed = true;
        self.matched_recipe_id = None;
        self.ingredients.clear();
    }

    /// Record a completed match. Clears the doomed flag.
    pub fn set_matched(&mut self, recipe: Ident) {
        self.doomed = false;
        self.matched_recipe_id = Some(recipe);
    }

    pub fn clear_match(&mut self) {
        self.matched_recipe_id = None;
    }

    /// Wipe ingredients, doom and match. Thermal fields are untouched.
    pub fn clear_brew(&mut self) {
        self.ingredients.clear();
        self.doomed = false;
        self.matched_recipe_id = None;
    }

    /// True if any brew progress is recorded.
    pub fn has_brew(&self) -> bool {
        self.doomed || self.matched_recipe_id.is_some() || !self.ingredients.is_empty()
    }

    /// Turn the vessel into an empty one, dropping contents, brew and solid.
    pub fn empty_out(&mut self) {
        self.kind = VesselKind::Empty;
        self.level = 0;
        self.inserted_solid = None;
        self.clear_brew();
    }
}

/// Field-for-field equality, treating two `NaN` temperatures as equal.
impl PartialEq for VesselState {
    fn eq(&self, other: &Self) -> bool {
        fn same_temp(a: f32, b: f32) -> bool {
            (a.is_nan() && b.is_nan()) || a == b
        }
        self.kind == other.kind
            && self.level == other.level
            && same_temp(self.temp_c, other.temp_c)
            && same_temp(self.last_temp_c, other.last_temp_c)
            && self.boiling == other.boiling
            && self.doomed == other.doomed
            && self.matched_recipe_id == other.matched_recipe_id
            && self.ingredients == other.ingredients
            && self.inserted_solid == other.inserted_solid
    }
}
