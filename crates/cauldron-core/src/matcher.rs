//! Ingredient matching against the recipes of one liquid.
//!
//! A multiset of items is *satisfiable* for a recipe when every unit can be
//! assigned to its own slot whose matcher accepts it. Because slots may be
//! tags or alternative lists, this is a bipartite assignment problem and is
//! solved by backtracking, tightest-constrained units first. A satisfiable
//! multiset that fills every slot is an *exact* match.
//!
//! [`IngredientMatcher::try_add`] is a pure query: it never mutates the
//! multiset it is given. Callers apply the outcome themselves.

use crate::id::Ident;
use crate::item::ItemCatalog;
use crate::recipe::{Recipe, RecipeIndex};
use std::collections::BTreeMap;

/// Result classification of adding one item to a multiset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    /// No recipe for the liquid uses the item. Nothing is consumed.
    NotInAnyRecipe,
    /// Consumed; some recipes are still reachable, none is complete.
    Accepted,
    /// Consumed; exactly one recipe is now an exact match.
    Ready,
    /// Consumed; no recipe can be completed any more.
    Doomed,
    /// More than one recipe is an exact match. Nothing is consumed.
    Ambiguous,
}

impl MatchOutcome {
    /// Whether the caller should take the item and record it.
    pub fn consumes_item(self) -> bool {
        matches!(
            self,
            MatchOutcome::Accepted | MatchOutcome::Ready | MatchOutcome::Doomed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddResult {
    pub outcome: MatchOutcome,
    /// Satisfiable recipes before the item was added.
    pub candidates_before: usize,
    /// Satisfiable recipes after the item was added.
    pub candidates_after: usize,
    /// Set only for [`MatchOutcome::Ready`].
    pub matched_recipe_id: Option<Ident>,
}

/// Matches ingredient multisets against a [`RecipeIndex`].
#[derive(Clone, Copy)]
pub struct IngredientMatcher<'a> {
    recipes: &'a RecipeIndex,
    catalog: &'a dyn ItemCatalog,
}

impl<'a> IngredientMatcher<'a> {
    pub fn new(recipes: &'a RecipeIndex, catalog: &'a dyn ItemCatalog) -> Self {
        Self { recipes, catalog }
    }

    /// Classify adding `candidate` to `multiset` in a vessel of `liquid`.
    ///
    /// The candidate set is recomputed from scratch for the new multiset.
    pub fn try_add(
        &self,
        liquid: &Ident,
        multiset: &BTreeMap<Ident, u32>,
        candidate: &Ident,
    ) -> AddResult {
        let candidates_before = self.candidates(liquid, multiset).len();

        let relevant = self
            .recipes
            .for_liquid(liquid)
            .any(|r| r.mentions(candidate, self.catalog));
        if !relevant {
            return AddResult {
                outcome: MatchOutcome::NotInAnyRecipe,
                candidates_before,
                candidates_after: candidates_before,
                matched_recipe_id: None,
            };
        }

        let mut next = multiset.clone();
        *next.entry(candidate.clone()).or_insert(0) += 1;
        let total = unit_count(&next);

        let after = self.candidates(liquid, &next);
        let mut exact = after.iter().filter(|r| r.slot_count() == total);
        let first_exact = exact.next();
        let second_exact = exact.next();

        let (outcome, matched_recipe_id) = match (first_exact, second_exact) {
            (Some(_), Some(_)) => (MatchOutcome::Ambiguous, None),
            (Some(r), None) => (MatchOutcome::Ready, Some(r.id().clone())),
            (None, _) if after.is_empty() => (MatchOutcome::Doomed, None),
            (None, _) => (MatchOutcome::Accepted, None),
        };

        AddResult {
            outcome,
            candidates_before,
            candidates_after: after.len(),
            matched_recipe_id,
        }
    }

    /// Recipes for `liquid` that `multiset` can still grow into.
    pub fn candidates(&self, liquid: &Ident, multiset: &BTreeMap<Ident, u32>) -> Vec<&'a Recipe> {
        self.recipes
            .for_liquid(liquid)
            .filter(|r| self.can_satisfy(r, multiset))
            .collect()
    }

    /// Recipes for `liquid` that `multiset` matches exactly.
    pub fn exact_matches(
        &self,
        liquid: &Ident,
        multiset: &BTreeMap<Ident, u32>,
    ) -> Vec<&'a Recipe> {
        let total = unit_count(multiset);
        self.candidates(liquid, multiset)
            .into_iter()
            .filter(|r| r.slot_count() == total)
            .collect()
    }

    /// Whether the units of `multiset` fit one-to-one into the slots of `recipe`.
    pub fn can_satisfy(&self, recipe: &Recipe, multiset: &BTreeMap<Ident, u32>) -> bool {
        let slots = recipe.slots();
        let total = unit_count(multiset);
        if total == 0 {
            return true;
        }
        if total > slots.len() {
            return false;
        }

        // Compatible slot indices per distinct item, then one entry per unit.
        let mut units: Vec<Vec<usize>> = Vec::with_capacity(total);
        for (item, &count) in multiset {
            if count == 0 {
                continue;
            }
            let compatible: Vec<usize> = slots
                .iter()
                .enumerate()
                .filter(|(_, m)| m.accepts(item, self.catalog))
                .map(|(i, _)| i)
                .collect();
            if compatible.len() < count as usize {
                return false;
            }
            units.extend(std::iter::repeat_n(compatible, count as usize));
        }
        units.sort_by_key(Vec::len);

        let mut used = vec![false; slots.len()];
        assign(&units, 0, &mut used)
    }
}

fn assign(units: &[Vec<usize>], next: usize, used: &mut [bool]) -> bool {
    let Some(compatible) = units.get(next) else {
        return true;
    };
    for &slot in compatible {
        if used[slot] {
            continue;
        }
        used[slot] = true;
        if assign(units, next + 1, used) {
            return true;
        }
        used[slot] = false;
    }
    false
}

fn unit_count(multiset: &BTreeMap<Ident, u32>) -> usize {
    multiset.values().map(|&c| c as usize).sum()
}
