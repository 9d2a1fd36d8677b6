use crate::heat::HeatSourceRegistry;
use crate::item::{ItemCatalog, TagCatalog};
use crate::recipe::RecipeIndex;
use crate::transform::TransformRuleRegistry;
use std::fmt;
use std::sync::Arc;

/// Item catalog shared between the engine and its host.
pub type SharedCatalog = Arc<dyn ItemCatalog + Send + Sync>;

/// Immutable snapshot of every data-driven registry the engine consults.
///
/// The engine holds this behind an `Arc`; a reload builds a fresh snapshot
/// and swaps it in between ticks.
pub struct Registries {
    pub heat: HeatSourceRegistry,
    pub transforms: TransformRuleRegistry,
    pub recipes: RecipeIndex,
    pub catalog: SharedCatalog,
}

impl Registries {
    pub fn new(
        heat: HeatSourceRegistry,
        transforms: TransformRuleRegistry,
        recipes: RecipeIndex,
        catalog: SharedCatalog,
    ) -> Self {
        Self {
            heat,
            transforms,
            recipes,
            catalog,
        }
    }

    /// No heat sources, no rules, no recipes, an empty catalog.
    pub fn empty() -> Self {
        Self::new(
            HeatSourceRegistry::default(),
            TransformRuleRegistry::default(),
            RecipeIndex::default(),
            Arc::new(TagCatalog::new()),
        )
    }

    pub fn catalog(&self) -> &dyn ItemCatalog {
        self.catalog.as_ref()
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Registries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registries")
            .field("heat", &self.heat)
            .field("transforms", &self.transforms)
            .field("recipes", &self.recipes.len())
            .finish_non_exhaustive()
    }
}
