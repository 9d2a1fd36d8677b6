//! Data-driven registry loading.
//!
//! Feature-gated behind `data-loader`. Each configuration section arrives as
//! a [`serde_json::Value`] (any self-describing format converts into one) and
//! is turned into its immutable registry here. Individual malformed entries
//! are skipped and reported as [`ConfigWarning`]s; only a section whose
//! overall shape is wrong fails with a [`DataLoadError`].

use crate::config::EngineConfig;
use crate::heat::{HeatProfile, HeatSourceRegistry};
use crate::id::Ident;
use crate::item::{ItemCatalog, ItemStack, TagCatalog};
use crate::kind::{MAX_LEVEL, VesselKind};
use crate::recipe::{CountedIngredient, Recipe, RecipeIndex, SlotMatcher};
use crate::registry::Registries;
use crate::transform::{LevelPolicy, ThermalTransform, TransformMode, TransformRuleRegistry};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub const HEAT_SOURCES: &str = "heat_sources";
pub const TRANSFORMS: &str = "transforms";
pub const RECIPES: &str = "recipes";
pub const CATALOG: &str = "catalog";
pub const ENGINE: &str = "engine";

/// Every section name, in load order. The catalog comes first because the
/// other sections validate item references against it.
pub const SECTIONS: [&str; 5] = [CATALOG, HEAT_SOURCES, TRANSFORMS, RECIPES, ENGINE];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("section '{section}' must be {expected}")]
    Shape {
        section: &'static str,
        expected: &'static str,
    },
}

/// A configuration entry that was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub section: String,
    pub entry: String,
    pub detail: String,
}

impl ConfigWarning {
    pub fn new(section: &str, entry: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            entry: entry.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.section, self.entry, self.detail)
    }
}

/// Collects warnings for one section and logs each as it arrives.
struct Warnings<'w> {
    section: &'static str,
    out: &'w mut Vec<ConfigWarning>,
}

impl Warnings<'_> {
    fn push(&mut self, entry: impl Into<String>, detail: impl fmt::Display) {
        let warning = ConfigWarning::new(self.section, entry, detail.to_string());
        log::warn!("skipping config entry {warning}");
        self.out.push(warning);
    }

    fn id(&mut self, entry: &str, raw: &str) -> Option<Ident> {
        match Ident::parse(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                self.push(entry, e);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub placeable: Vec<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
    /// Treat every item as known.
    #[serde(default)]
    pub open: bool,
}

#[derive(Debug, Deserialize)]
pub struct HeatSourcesData {
    #[serde(default = "default_scale")]
    pub heat_per_tick_scale: f32,
    #[serde(default)]
    pub blocks: BTreeMap<String, Value>,
    #[serde(default)]
    pub fluids: BTreeMap<String, Value>,
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct HeatEntryData {
    pub max_temp_c: f32,
    #[serde(alias = "approach_rate_c_per_tick")]
    pub heat_per_tick_c: f32,
}

#[derive(Debug, Deserialize)]
pub struct TransformsData {
    /// Older single-rule-per-kind form.
    #[serde(default)]
    pub cooling: BTreeMap<String, Value>,
    #[serde(default)]
    pub transforms: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct RuleData {
    pub at_or_below_temp_c: Option<f32>,
    pub at_or_above_temp_c: Option<f32>,
    pub set_kind: String,
    pub required_level: Option<u8>,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    pub required_solid: Option<String>,
    #[serde(default, alias = "clear_solid")]
    pub consume_solid: bool,
    pub set_level: Option<u8>,
    #[serde(default)]
    pub preserve_level: bool,
    pub drop: Option<DropData>,
    #[serde(default)]
    pub reset_brew: bool,
    #[serde(default)]
    pub untrack: bool,
}

#[derive(Debug, Deserialize)]
pub struct DropData {
    pub item: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct RecipeData {
    pub id: String,
    #[serde(default = "default_liquid")]
    pub liquid: String,
    pub ingredients: Vec<IngredientData>,
    #[serde(default = "default_result")]
    pub result: String,
    pub result_variant: Option<String>,
}

fn default_liquid() -> String {
    "minecraft:water".to_string()
}

fn default_result() -> String {
    "minecraft:potion".to_string()
}

/// One ingredient slot group. Exactly one of `item`, `tag` or `any_of`.
#[derive(Debug, Deserialize)]
pub struct IngredientData {
    pub item: Option<String>,
    pub tag: Option<String>,
    pub any_of: Option<Vec<String>>,
    #[serde(default = "default_count")]
    pub count: u32,
}

// ---------------------------------------------------------------------------
// Section conversion
// ---------------------------------------------------------------------------

fn section<T: DeserializeOwned>(value: &Value) -> Result<T, DataLoadError> {
    Ok(T::deserialize(value)?)
}

pub fn catalog_from_value(
    value: &Value,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<TagCatalog, DataLoadError> {
    let data: CatalogData = section(value)?;
    let mut w = Warnings {
        section: CATALOG,
        out: warnings,
    };
    let mut catalog = if data.open {
        TagCatalog::open()
    } else {
        TagCatalog::new()
    };
    for raw in &data.items {
        if let Some(id) = w.id("items", raw) {
            catalog.add_item(id);
        }
    }
    for raw in &data.placeable {
        if let Some(id) = w.id("placeable", raw) {
            catalog.add_placeable(id);
        }
    }
    for (raw_tag, members) in &data.tags {
        let Some(tag) = w.id("tags", raw_tag) else {
            continue;
        };
        for raw in members {
            if let Some(id) = w.id(raw_tag, raw) {
                catalog.add_to_tag(tag.clone(), id);
            }
        }
    }
    Ok(catalog)
}

pub fn heat_sources_from_value(
    value: &Value,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<HeatSourceRegistry, DataLoadError> {
    let data: HeatSourcesData = section(value)?;
    let mut w = Warnings {
        section: HEAT_SOURCES,
        out: warnings,
    };
    let mut builder = HeatSourceRegistry::builder();
    if !(data.heat_per_tick_scale.is_finite() && data.heat_per_tick_scale > 0.0) {
        w.push(
            "heat_per_tick_scale",
            format!("invalid scale {}, using 1.0", data.heat_per_tick_scale),
        );
    }
    builder.rate_scale(data.heat_per_tick_scale);

    for (is_fluid, entries) in [(false, &data.blocks), (true, &data.fluids)] {
        for (raw, entry) in entries {
            let Some(id) = w.id(raw, raw) else {
                continue;
            };
            let profile = HeatEntryData::deserialize(entry)
                .map_err(|e| e.to_string())
                .and_then(|d| {
                    HeatProfile::new(d.max_temp_c, d.heat_per_tick_c).map_err(|e| e.to_string())
                });
            match profile {
                Ok(p) if is_fluid => {
                    builder.register_fluid(id, p);
                }
                Ok(p) => {
                    builder.register_block(id, p);
                }
                Err(detail) => w.push(raw.as_str(), detail),
            }
        }
    }
    Ok(builder.build())
}

pub fn transforms_from_value(
    value: &Value,
    catalog: &dyn ItemCatalog,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<TransformRuleRegistry, DataLoadError> {
    let data: TransformsData = section(value)?;
    let mut w = Warnings {
        section: TRANSFORMS,
        out: warnings,
    };
    let mut builder = TransformRuleRegistry::builder();

    let cooling = data
        .cooling
        .iter()
        .map(|(kind, rule)| (kind, 0, rule));
    let listed = data
        .transforms
        .iter()
        .flat_map(|(kind, rules)| rules.iter().enumerate().map(move |(i, r)| (kind, i, r)));

    for (raw_kind, index, raw_rule) in cooling.chain(listed) {
        let entry = format!("{raw_kind}[{index}]");
        let from: VesselKind = match raw_kind.parse() {
            Ok(kind) => kind,
            Err(e) => {
                w.push(entry, e);
                continue;
            }
        };
        let rule = match rule_from_value(raw_rule, catalog) {
            Ok(rule) => rule,
            Err(detail) => {
                w.push(entry, detail);
                continue;
            }
        };
        if let Err(e) = builder.add(from, rule) {
            w.push(entry, e);
        }
    }
    Ok(builder.build())
}

fn rule_from_value(value: &Value, catalog: &dyn ItemCatalog) -> Result<ThermalTransform, String> {
    let data = RuleData::deserialize(value).map_err(|e| e.to_string())?;
    let (mode, threshold) = match (data.at_or_below_temp_c, data.at_or_above_temp_c) {
        (Some(t), None) => (TransformMode::Cooling, t),
        (None, Some(t)) => (TransformMode::Heating, t),
        _ => {
            return Err(
                "exactly one of at_or_below_temp_c and at_or_above_temp_c is required".into(),
            );
        }
    };
    let set_kind: VesselKind = data.set_kind.parse().map_err(|e| format!("{e}"))?;

    let known = |raw: &str| -> Result<Ident, String> {
        let id = Ident::parse(raw).map_err(|e| e.to_string())?;
        if catalog.is_known(&id) {
            Ok(id)
        } else {
            Err(format!("unknown item '{id}'"))
        }
    };

    let mut rule = ThermalTransform::new(mode, threshold, set_kind);
    rule.required_level = data.required_level;
    rule.min_level = data.min_level;
    rule.max_level = data.max_level;
    rule.requires_solid = data.required_solid.as_deref().map(known).transpose()?;
    rule.consume_solid = data.consume_solid;
    rule.level = match (data.set_level, data.preserve_level) {
        (Some(level), _) if level > MAX_LEVEL => {
            return Err(format!("set_level {level} is outside 0..={MAX_LEVEL}"));
        }
        (Some(level), _) => LevelPolicy::Set(level),
        (None, true) => LevelPolicy::Preserve,
        (None, false) => LevelPolicy::KindDefault,
    };
    rule.drop = match &data.drop {
        Some(drop) => Some(ItemStack::new(known(&drop.item)?, drop.count)),
        None => None,
    };
    rule.reset_brew = data.reset_brew;
    rule.untrack = data.untrack;
    Ok(rule)
}

/// Accepts a bare list, or a table holding the list under `recipes` (the
/// only shape TOML can express).
pub fn recipes_from_value(
    value: &Value,
    catalog: &dyn ItemCatalog,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<RecipeIndex, DataLoadError> {
    let list = match value {
        Value::Array(list) => list,
        Value::Object(map) => match map.get(RECIPES) {
            Some(Value::Array(list)) => list,
            _ => {
                return Err(DataLoadError::Shape {
                    section: RECIPES,
                    expected: "a list or a table with a 'recipes' list",
                });
            }
        },
        _ => {
            return Err(DataLoadError::Shape {
                section: RECIPES,
                expected: "a list or a table with a 'recipes' list",
            });
        }
    };
    let mut w = Warnings {
        section: RECIPES,
        out: warnings,
    };
    let mut builder = RecipeIndex::builder();
    for (index, raw) in list.iter().enumerate() {
        let data = match RecipeData::deserialize(raw) {
            Ok(data) => data,
            Err(e) => {
                w.push(format!("#{index}"), e);
                continue;
            }
        };
        match recipe_from_data(&data, catalog) {
            Ok(recipe) => {
                if let Err(e) = builder.register(recipe) {
                    w.push(data.id.as_str(), e);
                }
            }
            Err(detail) => w.push(data.id.as_str(), detail),
        }
    }
    Ok(builder.build())
}

fn recipe_from_data(data: &RecipeData, catalog: &dyn ItemCatalog) -> Result<Recipe, String> {
    let parse = |raw: &str| Ident::parse(raw).map_err(|e| e.to_string());
    let known = |raw: &str| -> Result<Ident, String> {
        let id = parse(raw)?;
        if catalog.is_known(&id) {
            Ok(id)
        } else {
            Err(format!("unknown item '{id}'"))
        }
    };

    let mut ingredients = Vec::with_capacity(data.ingredients.len());
    for ing in &data.ingredients {
        let matcher = match (&ing.item, &ing.tag, &ing.any_of) {
            (Some(item), None, None) => SlotMatcher::Item(known(item)?),
            (None, Some(tag), None) => SlotMatcher::Tag(parse(tag)?),
            (None, None, Some(alternatives)) => SlotMatcher::AnyOf(
                alternatives
                    .iter()
                    .map(|raw| known(raw))
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Err("ingredient needs exactly one of item, tag, any_of".into()),
        };
        ingredients.push(CountedIngredient {
            matcher,
            count: ing.count,
        });
    }

    Recipe::new(
        parse(&data.id)?,
        parse(&data.liquid)?,
        ingredients,
        parse(&data.result)?,
        data.result_variant.as_deref().map(parse).transpose()?,
    )
    .map_err(|e| e.to_string())
}

pub fn engine_config_from_value(value: &Value) -> Result<EngineConfig, DataLoadError> {
    section(value)
}

// ---------------------------------------------------------------------------
// Single-document loading
// ---------------------------------------------------------------------------

/// Everything one load produced.
#[derive(Debug)]
pub struct RegistryBundle {
    pub registries: Registries,
    pub config: EngineConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Load every section from one JSON object keyed by section name.
///
/// Missing sections are empty, except the catalog, which defaults to an open
/// catalog so item references are not rejected.
pub fn registries_from_json(json: &str) -> Result<RegistryBundle, DataLoadError> {
    let root: Value = serde_json::from_str(json)?;
    let Value::Object(sections) = root else {
        return Err(DataLoadError::Shape {
            section: "root",
            expected: "an object keyed by section name",
        });
    };
    let mut warnings = Vec::new();

    let catalog = match sections.get(CATALOG) {
        Some(v) => catalog_from_value(v, &mut warnings)?,
        None => TagCatalog::open(),
    };
    let heat = match sections.get(HEAT_SOURCES) {
        Some(v) => heat_sources_from_value(v, &mut warnings)?,
        None => HeatSourceRegistry::default(),
    };
    let transforms = match sections.get(TRANSFORMS) {
        Some(v) => transforms_from_value(v, &catalog, &mut warnings)?,
        None => TransformRuleRegistry::default(),
    };
    let recipes = match sections.get(RECIPES) {
        Some(v) => recipes_from_value(v, &catalog, &mut warnings)?,
        None => RecipeIndex::default(),
    };
    let config = match sections.get(ENGINE) {
        Some(v) => engine_config_from_value(v)?,
        None => EngineConfig::default(),
    };

    Ok(RegistryBundle {
        registries: Registries::new(heat, transforms, recipes, Arc::new(catalog)),
        config,
        warnings,
    })
}
