//! Directory loading with per-section fall-back.
//!
//! A data directory holds up to five section files (`catalog`,
//! `heat_sources`, `transforms`, `recipes`, `engine`), each in exactly one
//! of RON, TOML or JSON. Sections load independently: a section whose file
//! fails as a whole keeps whatever the previous load had for it, and bad
//! entries inside a file are skipped with a [`ConfigWarning`].

use crate::loader::{self, DataLoadError};
use cauldron_core::config::EngineConfig;
use cauldron_core::data_loader::{
    self as sections, CATALOG, ConfigWarning, ENGINE, HEAT_SOURCES, RECIPES, TRANSFORMS,
};
use cauldron_core::heat::HeatSourceRegistry;
use cauldron_core::item::TagCatalog;
use cauldron_core::recipe::RecipeIndex;
use cauldron_core::registry::{Registries, SharedCatalog};
use cauldron_core::transform::TransformRuleRegistry;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ===========================================================================
// Output types
// ===========================================================================

/// The registries and engine config produced by one load.
#[derive(Debug, Clone)]
pub struct GameData {
    pub registries: Arc<Registries>,
    pub config: EngineConfig,
}

impl GameData {
    /// What a first load falls back to: nothing registered and an empty
    /// catalog.
    pub fn empty() -> Self {
        Self {
            registries: Arc::new(Registries::empty()),
            config: EngineConfig::default(),
        }
    }
}

impl Default for GameData {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of loading a directory. Never fails as a whole.
#[derive(Debug)]
pub struct LoadReport {
    pub data: GameData,
    /// Entries that were skipped.
    pub warnings: Vec<ConfigWarning>,
    /// Sections that fell back, with the reason.
    pub errors: Vec<(&'static str, DataLoadError)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Names of the sections that kept their previous content.
    pub fn failed_sections(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(|(section, _)| *section)
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load a data directory for the first time.
pub fn load_game_data(dir: &Path) -> LoadReport {
    load_sections(dir, None)
}

/// Reload a data directory. Sections that fail keep their content from
/// `previous`.
pub fn reload_game_data(dir: &Path, previous: &GameData) -> LoadReport {
    load_sections(dir, Some(previous))
}

/// Read one section file. `Ok(None)` means the file does not exist.
fn read_section(dir: &Path, section: &str) -> Result<Option<(PathBuf, Value)>, DataLoadError> {
    match loader::find_data_file(dir, section)? {
        Some(path) => {
            let value = loader::read_value(&path)?;
            Ok(Some((path, value)))
        }
        None => Ok(None),
    }
}

struct SectionLoader<'a> {
    dir: &'a Path,
    warnings: Vec<ConfigWarning>,
    errors: Vec<(&'static str, DataLoadError)>,
}

impl SectionLoader<'_> {
    /// Load `section`, using `missing` when the file is absent and
    /// `fallback` when it fails.
    fn load<T>(
        &mut self,
        section: &'static str,
        missing: impl FnOnce() -> T,
        fallback: impl FnOnce() -> T,
        convert: impl FnOnce(&Value, &mut Vec<ConfigWarning>) -> Result<T, sections::DataLoadError>,
    ) -> T {
        let result = read_section(self.dir, section).and_then(|found| match found {
            Some((file, value)) => convert(&value, &mut self.warnings)
                .map(Some)
                .map_err(|source| DataLoadError::Section { file, source }),
            None => Ok(None),
        });
        match result {
            Ok(Some(loaded)) => loaded,
            Ok(None) => {
                log::debug!("no {section} file in {}, using defaults", self.dir.display());
                missing()
            }
            Err(e) => {
                log::warn!("failed to load {section}, keeping previous content: {e}");
                self.errors.push((section, e));
                fallback()
            }
        }
    }
}

fn load_sections(dir: &Path, previous: Option<&GameData>) -> LoadReport {
    let prev = previous.map(|p| p.registries.as_ref());
    let mut sl = SectionLoader {
        dir,
        warnings: Vec::new(),
        errors: Vec::new(),
    };

    let catalog: SharedCatalog = sl.load(
        CATALOG,
        || Arc::new(TagCatalog::open()) as SharedCatalog,
        || match prev {
            Some(p) => Arc::clone(&p.catalog),
            None => Arc::new(TagCatalog::new()) as SharedCatalog,
        },
        |v, w| sections::catalog_from_value(v, w).map(|c| Arc::new(c) as SharedCatalog),
    );

    let heat = sl.load(
        HEAT_SOURCES,
        HeatSourceRegistry::default,
        || prev.map(|p| p.heat.clone()).unwrap_or_default(),
        sections::heat_sources_from_value,
    );

    let transforms = sl.load(
        TRANSFORMS,
        TransformRuleRegistry::default,
        || prev.map(|p| p.transforms.clone()).unwrap_or_default(),
        |v, w| sections::transforms_from_value(v, catalog.as_ref(), w),
    );

    let recipes = sl.load(
        RECIPES,
        RecipeIndex::default,
        || prev.map(|p| p.recipes.clone()).unwrap_or_default(),
        |v, w| sections::recipes_from_value(v, catalog.as_ref(), w),
    );

    let config = sl.load(
        ENGINE,
        EngineConfig::default,
        || previous.map(|p| p.config.clone()).unwrap_or_default(),
        |v, _| sections::engine_config_from_value(v),
    );

    log::info!(
        "loaded game data from {}: {} heat sources, {} transform rules, {} recipes, {} warnings, {} failed sections",
        dir.display(),
        heat.block_count() + heat.fluid_count(),
        transforms.rule_count(),
        recipes.len(),
        sl.warnings.len(),
        sl.errors.len(),
    );

    LoadReport {
        data: GameData {
            registries: Arc::new(Registries::new(heat, transforms, recipes, catalog)),
            config,
        },
        warnings: sl.warnings,
        errors: sl.errors,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
