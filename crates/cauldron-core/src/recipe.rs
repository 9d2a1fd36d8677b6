//! Brewing recipes and the per-liquid recipe index.

use crate::id::Ident;
use crate::item::ItemCatalog;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// What a single ingredient slot accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotMatcher {
    /// Exactly this item.
    Item(Ident),
    /// Any member of this tag.
    Tag(Ident),
    /// Any of the listed items.
    AnyOf(Vec<Ident>),
}

impl SlotMatcher {
    pub fn accepts(&self, item: &Ident, catalog: &dyn ItemCatalog) -> bool {
        match self {
            SlotMatcher::Item(id) => id == item,
            SlotMatcher::Tag(tag) => catalog.in_tag(item, tag),
            SlotMatcher::AnyOf(ids) => ids.contains(item),
        }
    }
}

/// A slot matcher required `count` times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedIngredient {
    pub matcher: SlotMatcher,
    pub count: u32,
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    #[error("recipe '{0}' has no ingredients")]
    NoIngredients(Ident),
    #[error("recipe '{recipe}' has an ingredient with count 0")]
    ZeroCount { recipe: Ident },
    #[error("recipe '{recipe}' has an empty any_of ingredient")]
    EmptyAlternatives { recipe: Ident },
    #[error("recipe '{recipe}' needs {slots} ingredient units; at most {MAX_RECIPE_SLOTS} allowed")]
    TooManySlots { recipe: Ident, slots: u64 },
    #[error("duplicate recipe id '{0}'")]
    Duplicate(Ident),
}

/// Upper bound on the units a single recipe may consume.
pub const MAX_RECIPE_SLOTS: usize = 64;

/// One brewing recipe: a liquid plus counted ingredient slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: Ident,
    liquid: Ident,
    ingredients: Vec<CountedIngredient>,
    slots: Vec<SlotMatcher>,
    result: Ident,
    result_variant: Option<Ident>,
}

impl Recipe {
    pub fn new(
        id: Ident,
        liquid: Ident,
        ingredients: Vec<CountedIngredient>,
        result: Ident,
        result_variant: Option<Ident>,
    ) -> Result<Self, RecipeError> {
        if ingredients.is_empty() {
            return Err(RecipeError::NoIngredients(id));
        }
        for ing in &ingredients {
            if ing.count == 0 {
                return Err(RecipeError::ZeroCount { recipe: id });
            }
            if matches!(&ing.matcher, SlotMatcher::AnyOf(ids) if ids.is_empty()) {
                return Err(RecipeError::EmptyAlternatives { recipe: id });
            }
        }
        let total: u64 = ingredients.iter().map(|ing| u64::from(ing.count)).sum();
        if total > MAX_RECIPE_SLOTS as u64 {
            return Err(RecipeError::TooManySlots { recipe: id, slots: total });
        }
        let slots = ingredients
            .iter()
            .flat_map(|ing| std::iter::repeat_n(ing.matcher.clone(), ing.count as usize))
            .collect();
        Ok(Self {
            id,
            liquid,
            ingredients,
            slots,
            result,
            result_variant,
        })
    }

    pub fn id(&self) -> &Ident {
        &self.id
    }

    pub fn liquid(&self) -> &Ident {
        &self.liquid
    }

    pub fn ingredients(&self) -> &[CountedIngredient] {
        &self.ingredients
    }

    /// One matcher per unit the recipe consumes.
    pub fn slots(&self) -> &[SlotMatcher] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn result(&self) -> &Ident {
        &self.result
    }

    pub fn result_variant(&self) -> Option<&Ident> {
        self.result_variant.as_ref()
    }

    /// Whether any slot of this recipe accepts `item`.
    pub fn mentions(&self, item: &Ident, catalog: &dyn ItemCatalog) -> bool {
        self.ingredients
            .iter()
            .any(|ing| ing.matcher.accepts(item, catalog))
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RecipeIndexBuilder {
    recipes: Vec<Recipe>,
    by_id: BTreeMap<Ident, usize>,
}

impl RecipeIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe. Ids must be unique.
    pub fn register(&mut self, recipe: Recipe) -> Result<&mut Self, RecipeError> {
        if self.by_id.contains_key(recipe.id()) {
            return Err(RecipeError::Duplicate(recipe.id().clone()));
        }
        self.by_id.insert(recipe.id().clone(), self.recipes.len());
        self.recipes.push(recipe);
        Ok(self)
    }

    pub fn build(self) -> RecipeIndex {
        let mut by_liquid: BTreeMap<Ident, Vec<usize>> = BTreeMap::new();
        for (idx, recipe) in self.recipes.iter().enumerate() {
            by_liquid
                .entry(recipe.liquid().clone())
                .or_default()
                .push(idx);
        }
        RecipeIndex {
            recipes: self.recipes,
            by_id: self.by_id,
            by_liquid,
        }
    }
}

/// Immutable recipe lookup by id and by liquid.
///
/// Recipes for a liquid are yielded in registration order.
#[derive(Debug, Clone, Default)]
pub struct RecipeIndex {
    recipes: Vec<Recipe>,
    by_id: BTreeMap<Ident, usize>,
    by_liquid: BTreeMap<Ident, Vec<usize>>,
}

impl RecipeIndex {
    pub fn builder() -> RecipeIndexBuilder {
        RecipeIndexBuilder::new()
    }

    pub fn get(&self, id: &Ident) -> Option<&Recipe> {
        self.by_id.get(id).map(|&idx| &self.recipes[idx])
    }

    pub fn for_liquid<'a>(&'a self, liquid: &Ident) -> impl Iterator<Item = &'a Recipe> + 'a {
        self.by_liquid
            .get(liquid)
            .into_iter()
            .flatten()
            .map(|&idx| &self.recipes[idx])
    }

    /// Largest slot count among recipes for `liquid`, or 0 if none.
    pub fn max_slot_count(&self, liquid: &Ident) -> usize {
        self.for_liquid(liquid)
            .map(Recipe::slot_count)
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::TagCatalog;

    fn id(s: &str) -> Ident {
        Ident::parse(s).unwrap()
    }

    fn item(s: &str, count: u32) -> CountedIngredient {
        CountedIngredient {
            matcher: SlotMatcher::Item(id(s)),
            count,
        }
    }

    fn recipe(name: &str, liquid: &str, ings: Vec<CountedIngredient>) -> Recipe {
        Recipe::new(id(name), id(liquid), ings, id("potion"), None).unwrap()
    }

    #[test]
    fn slots_expand_counts() {
        let r = recipe("r", "water", vec![item("a", 2), item("b", 1)]);
        assert_eq!(r.slot_count(), 3);
        assert_eq!(r.slots()[0], SlotMatcher::Item(id("a")));
        assert_eq!(r.slots()[1], SlotMatcher::Item(id("a")));
        assert_eq!(r.slots()[2], SlotMatcher::Item(id("b")));
    }

    #[test]
    fn rejects_invalid_recipes() {
        assert!(matches!(
            Recipe::new(id("r"), id("water"), vec![], id("potion"), None),
            Err(RecipeError::NoIngredients(_))
        ));
        assert!(matches!(
            Recipe::new(id("r"), id("water"), vec![item("a", 0)], id("potion"), None),
            Err(RecipeError::ZeroCount { .. })
        ));
        let empty_any = CountedIngredient {
            matcher: SlotMatcher::AnyOf(vec![]),
            count: 1,
        };
        assert!(matches!(
            Recipe::new(id("r"), id("water"), vec![empty_any], id("potion"), None),
            Err(RecipeError::EmptyAlternatives { .. })
        ));
        assert!(matches!(
            Recipe::new(id("r"), id("water"), vec![item("a", u32::MAX)], id("potion"), None),
            Err(RecipeError::TooManySlots { slots, .. }) if slots == u64::from(u32::MAX)
        ));
        let at_cap = vec![item("a", 60), item("b", 4)];
        assert_eq!(
            Recipe::new(id("r"), id("water"), at_cap, id("potion"), None)
                .unwrap()
                .slot_count(),
            MAX_RECIPE_SLOTS
        );
    }

    #[test]
    fn matcher_kinds() {
        let mut cat = TagCatalog::new();
        cat.add_to_tag(id("flowers"), id("poppy"));
        assert!(SlotMatcher::Item(id("a")).accepts(&id("a"), &cat));
        assert!(!SlotMatcher::Item(id("a")).accepts(&id("b"), &cat));
        assert!(SlotMatcher::Tag(id("flowers")).accepts(&id("poppy"), &cat));
        assert!(!SlotMatcher::Tag(id("flowers")).accepts(&id("a"), &cat));
        let any = SlotMatcher::AnyOf(vec![id("a"), id("b")]);
        assert!(any.accepts(&id("b"), &cat));
        assert!(!any.accepts(&id("c"), &cat));
    }

    #[test]
    fn index_groups_by_liquid() {
        let mut b = RecipeIndex::builder();
        b.register(recipe("r1", "water", vec![item("a", 1)])).unwrap();
        b.register(recipe("r2", "lava", vec![item("a", 1)])).unwrap();
        b.register(recipe("r3", "water", vec![item("a", 2), item("b", 2)]))
            .unwrap();
        let idx = b.build();

        let water: Vec<_> = idx.for_liquid(&id("water")).map(|r| r.id().clone()).collect();
        assert_eq!(water, vec![id("r1"), id("r3")]);
        assert_eq!(idx.max_slot_count(&id("water")), 4);
        assert_eq!(idx.max_slot_count(&id("milk")), 0);
        assert_eq!(idx.for_liquid(&id("milk")).count(), 0);
        assert_eq!(idx.get(&id("r2")).unwrap().liquid(), &id("lava"));
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut b = RecipeIndex::builder();
        b.register(recipe("r1", "water", vec![item("a", 1)])).unwrap();
        let err = b
            .register(recipe("r1", "water", vec![item("b", 1)]))
            .unwrap_err();
        assert_eq!(err, RecipeError::Duplicate(id("r1")));
    }
}
