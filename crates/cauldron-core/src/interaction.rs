//! Externally triggered vessel operations.
//!
//! Each call returns an [`Interaction`]: `Handled` means the engine acted and
//! the host should suppress its default behaviour (and, for item inputs,
//! take the item); `NotApplicable` means the host is free to fall through.
//! A refusal leaves the vessel unchanged, with one exception: extracting from
//! a brew whose recipe has vanished dooms it ([`Refusal::RecipeMissing`]).

use crate::engine::Engine;
use crate::event::UntrackReason;
use crate::id::{Ident, VesselKey};
use crate::item::ItemStack;
use crate::kind::VesselKind;
use crate::matcher::{AddResult, MatchOutcome};

/// Result of an interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction<T> {
    Handled(T),
    NotApplicable(Refusal),
}

impl<T> Interaction<T> {
    pub fn is_handled(&self) -> bool {
        matches!(self, Interaction::Handled(_))
    }

    pub fn handled(self) -> Option<T> {
        match self {
            Interaction::Handled(value) => Some(value),
            Interaction::NotApplicable(_) => None,
        }
    }

    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            Interaction::Handled(_) => None,
            Interaction::NotApplicable(reason) => Some(reason),
        }
    }
}

/// Why an interaction did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    NotTracked,
    /// Filling with `Empty` or a non-fluid kind.
    NotFillable(VesselKind),
    AlreadyFull,
    NothingToDrain,
    NotBrewable,
    Doomed,
    NotBoiling,
    NotInAnyRecipe,
    /// More than one recipe would be matched exactly; the item was not taken.
    Ambiguous { candidates: usize },
    SolidOccupied,
    NoSolidSlot,
    NotPlaceable,
    /// No transform rule for the current kind uses this solid.
    SolidNotWanted,
    NoSolid,
    NothingToExtract,
    /// The matched recipe no longer exists. The vessel has been doomed.
    RecipeMissing(Ident),
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub previous: VesselKind,
    pub kind: VesselKind,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drain {
    pub kind: VesselKind,
    pub level_after: u8,
    pub untracked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientAdded {
    pub result: AddResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub output: ItemStack,
    pub result_variant: Option<Ident>,
    pub level_after: u8,
    pub untracked: bool,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl Engine {
    /// Start tracking a newly placed container. Returns `true` if it was new.
    pub fn place(&mut self, key: VesselKey) -> bool {
        let existed = self.store.is_tracked(key);
        self.store.ensure_tracked(key);
        !existed
    }

    /// Fill the vessel with `kind`. `level` defaults to the kind's default
    /// level and is clamped into its range.
    ///
    /// Starts a new batch: thermals restart from the kind's baseline on the
    /// next tick, and brew state and any solid are cleared.
    pub fn fill(
        &mut self,
        key: VesselKey,
        kind: VesselKind,
        level: Option<u8>,
    ) -> Interaction<Fill> {
        if kind == VesselKind::Empty || kind == VesselKind::Frozen {
            return Interaction::NotApplicable(Refusal::NotFillable(kind));
        }
        let level = level.map_or(kind.default_level(), |l| kind.clamp_level(l));
        let vessel = self.store.ensure_tracked(key);
        if vessel.kind == kind && vessel.level >= level {
            return Interaction::NotApplicable(Refusal::AlreadyFull);
        }
        let previous = vessel.kind;
        vessel.kind = kind;
        vessel.level = level;
        vessel.inserted_solid = None;
        vessel.clear_brew();
        vessel.reset_thermals();
        self.store.mark_dirty(key);
        Interaction::Handled(Fill {
            previous,
            kind,
            level,
        })
    }

    /// Remove `amount` levels. Kinds without graded levels drain completely.
    /// Reaching level 0 empties and untracks the vessel.
    pub fn drain(&mut self, key: VesselKey, amount: u8) -> Interaction<Drain> {
        let Some(vessel) = self.store.get_mut(key) else {
            return Interaction::NotApplicable(Refusal::NotTracked);
        };
        if !vessel.has_contents() || amount == 0 {
            return Interaction::NotApplicable(Refusal::NothingToDrain);
        }
        let kind = vessel.kind;
        let level_after = if kind.supports_levels() {
            vessel.level.saturating_sub(amount)
        } else {
            0
        };
        if level_after == 0 {
            self.store.untrack(key);
            log::debug!("vessel at {key} drained empty; reason {:?}", UntrackReason::Emptied);
            return Interaction::Handled(Drain {
                kind,
                level_after,
                untracked: true,
            });
        }
        vessel.level = level_after;
        self.store.mark_dirty(key);
        Interaction::Handled(Drain {
            kind,
            level_after,
            untracked: false,
        })
    }

    /// Throw the contents away and stop tracking.
    pub fn discard(&mut self, key: VesselKey) -> Interaction<VesselKind> {
        match self.store.untrack(key) {
            Some(vessel) => {
                log::debug!("vessel at {key} discarded");
                Interaction::Handled(vessel.kind)
            }
            None => Interaction::NotApplicable(Refusal::NotTracked),
        }
    }

    /// Drop one unit of `item` into the brew.
    ///
    /// Adding a recipe-relevant item to an already matched brew over-fills it
    /// and dooms the vessel. Ambiguous or irrelevant items are refused and
    /// leave the vessel untouched.
    pub fn insert_ingredient(
        &mut self,
        key: VesselKey,
        item: &Ident,
    ) -> Interaction<IngredientAdded> {
        let registries = self.registries.clone();
        let catalog = registries.catalog();
        let require_boiling = self.config.brewing.require_boiling;

        let Some(vessel) = self.store.get_mut(key) else {
            return Interaction::NotApplicable(Refusal::NotTracked);
        };
        let liquid = match vessel.kind.liquid() {
            Some(liquid) if vessel.kind.is_brewable() && vessel.level > 0 => liquid,
            _ => return Interaction::NotApplicable(Refusal::NotBrewable),
        };
        if vessel.is_doomed() {
            return Interaction::NotApplicable(Refusal::Doomed);
        }
        if require_boiling && !vessel.boiling {
            return Interaction::NotApplicable(Refusal::NotBoiling);
        }

        let matcher = crate::matcher::IngredientMatcher::new(&registries.recipes, catalog);
        if vessel.matched_recipe_id().is_some() {
            let relevant = registries
                .recipes
                .for_liquid(&liquid)
                .any(|r| r.mentions(item, catalog));
            if !relevant {
                return Interaction::NotApplicable(Refusal::NotInAnyRecipe);
            }
            let candidates_before = matcher.candidates(&liquid, vessel.ingredients()).len();
            vessel.doom();
            self.store.mark_dirty(key);
            log::debug!("vessel at {key} over-filled with {item}; doomed");
            return Interaction::Handled(IngredientAdded {
                result: AddResult {
                    outcome: MatchOutcome::Doomed,
                    candidates_before,
                    candidates_after: 0,
                    matched_recipe_id: None,
                },
            });
        }

        let result = matcher.try_add(&liquid, vessel.ingredients(), item);
        match result.outcome {
            MatchOutcome::NotInAnyRecipe => {
                return Interaction::NotApplicable(Refusal::NotInAnyRecipe);
            }
            MatchOutcome::Ambiguous => {
                let mut next = vessel.ingredients().clone();
                *next.entry(item.clone()).or_insert(0) += 1;
                let exact = matcher.exact_matches(&liquid, &next).len();
                log::warn!(
                    "ingredient {item} at {key} matches {exact} recipes exactly; check recipe data"
                );
                return Interaction::NotApplicable(Refusal::Ambiguous { candidates: exact });
            }
            MatchOutcome::Accepted => vessel.add_ingredient(item.clone()),
            MatchOutcome::Ready => {
                vessel.add_ingredient(item.clone());
                if let Some(recipe) = result.matched_recipe_id.clone() {
                    vessel.set_matched(recipe);
                }
            }
            MatchOutcome::Doomed => vessel.doom(),
        }
        self.store.mark_dirty(key);
        Interaction::Handled(IngredientAdded { result })
    }

    /// Place a solid into the vessel's solid slot.
    pub fn insert_solid(&mut self, key: VesselKey, item: &Ident) -> Interaction<()> {
        let registries = self.registries.clone();
        let Some(vessel) = self.store.get_mut(key) else {
            return Interaction::NotApplicable(Refusal::NotTracked);
        };
        if !vessel.kind.capabilities().accepts_solid {
            return Interaction::NotApplicable(Refusal::NoSolidSlot);
        }
        if vessel.inserted_solid.is_some() {
            return Interaction::NotApplicable(Refusal::SolidOccupied);
        }
        if !registries.catalog().is_placeable(item) {
            return Interaction::NotApplicable(Refusal::NotPlaceable);
        }
        if !registries.transforms.wants_solid(vessel.kind, item) {
            return Interaction::NotApplicable(Refusal::SolidNotWanted);
        }
        vessel.inserted_solid = Some(item.clone());
        self.store.mark_dirty(key);
        Interaction::Handled(())
    }

    /// Take the resident solid back out.
    pub fn take_solid(&mut self, key: VesselKey) -> Interaction<ItemStack> {
        let Some(vessel) = self.store.get_mut(key) else {
            return Interaction::NotApplicable(Refusal::NotTracked);
        };
        match vessel.inserted_solid.take() {
            Some(solid) => {
                self.store.mark_dirty(key);
                Interaction::Handled(ItemStack::one(solid))
            }
            None => Interaction::NotApplicable(Refusal::NoSolid),
        }
    }

    /// Take one serving out of a finished or failed brew.
    ///
    /// A matched brew yields its recipe result; a doomed brew yields the
    /// configured sludge. Either way the brew state is cleared and the level
    /// drops by one; at zero the vessel is emptied and untracked.
    pub fn extract(&mut self, key: VesselKey) -> Interaction<Extraction> {
        let registries = self.registries.clone();
        let doomed_output = self.config.brewing.doomed_output.clone();
        let Some(vessel) = self.store.get_mut(key) else {
            return Interaction::NotApplicable(Refusal::NotTracked);
        };
        if !vessel.kind.is_brewable() || vessel.level == 0 {
            return Interaction::NotApplicable(Refusal::NothingToExtract);
        }

        let (output, result_variant) = if let Some(recipe_id) = vessel.matched_recipe_id() {
            match registries.recipes.get(recipe_id) {
                Some(recipe) => (
                    ItemStack::one(recipe.result().clone()),
                    recipe.result_variant().cloned(),
                ),
                None => {
                    let missing = recipe_id.clone();
                    log::warn!("vessel at {key} matched unknown recipe {missing}; dooming");
                    vessel.doom();
                    self.store.mark_dirty(key);
                    return Interaction::NotApplicable(Refusal::RecipeMissing(missing));
                }
            }
        } else if vessel.is_doomed() {
            (ItemStack::one(doomed_output), None)
        } else {
            return Interaction::NotApplicable(Refusal::NothingToExtract);
        };

        vessel.clear_brew();
        vessel.level -= 1;
        let level_after = vessel.level;
        let untracked = level_after == 0;
        if untracked {
            self.store.untrack(key);
        } else {
            self.store.mark_dirty(key);
        }
        Interaction::Handled(Extraction {
            output,
            result_variant,
            level_after,
            untracked,
        })
    }
}
