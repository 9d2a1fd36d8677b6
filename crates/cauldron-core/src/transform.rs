//! Temperature-triggered kind transforms.
//!
//! Rules are grouped by the vessel kind they apply to and evaluated in
//! registration order. The first rule whose threshold and gates hold is
//! applied; a cascade into another rule waits for the next tick.

use crate::id::Ident;
use crate::item::{ItemCatalog, ItemStack};
use crate::kind::{MAX_LEVEL, VesselKind};
use crate::vessel::VesselState;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Rule definition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    /// Fires at or below the threshold.
    Cooling,
    /// Fires at or above the threshold.
    Heating,
}

/// What level the vessel ends up at after a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelPolicy {
    /// Use the output kind's default level.
    #[default]
    KindDefault,
    /// Keep the prior level (clamped into the output kind's range).
    Preserve,
    /// Force a level (clamped into the output kind's range).
    Set(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThermalTransform {
    pub mode: TransformMode,
    pub threshold_c: f32,
    pub required_level: Option<u8>,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    /// Rule only fires while exactly this solid sits in the vessel.
    pub requires_solid: Option<Ident>,
    pub consume_solid: bool,
    pub set_kind: VesselKind,
    pub level: LevelPolicy,
    pub drop: Option<ItemStack>,
    pub reset_brew: bool,
    pub untrack: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("threshold must be finite, got {0}")]
    NonFiniteThreshold(f32),
    #[error("level {0} is outside 0..={MAX_LEVEL}")]
    LevelOutOfRange(u8),
    #[error("min_level {min} is greater than max_level {max}")]
    InvertedLevelRange { min: u8, max: u8 },
    #[error("drop of '{0}' has count 0")]
    EmptyDrop(Ident),
}

impl ThermalTransform {
    /// A rule with no gates, no side effects and the kind's default level.
    pub fn new(mode: TransformMode, threshold_c: f32, set_kind: VesselKind) -> Self {
        Self {
            mode,
            threshold_c,
            required_level: None,
            min_level: None,
            max_level: None,
            requires_solid: None,
            consume_solid: false,
            set_kind,
            level: LevelPolicy::KindDefault,
            drop: None,
            reset_brew: false,
            untrack: false,
        }
    }

    pub fn validate(&self) -> Result<(), TransformError> {
        if !self.threshold_c.is_finite() {
            return Err(TransformError::NonFiniteThreshold(self.threshold_c));
        }
        let levels = [self.required_level, self.min_level, self.max_level];
        if let Some(bad) = levels.into_iter().flatten().find(|&l| l > MAX_LEVEL) {
            return Err(TransformError::LevelOutOfRange(bad));
        }
        if let (Some(min), Some(max)) = (self.min_level, self.max_level) {
            if min > max {
                return Err(TransformError::InvertedLevelRange { min, max });
            }
        }
        if let Some(drop) = &self.drop {
            if drop.count == 0 {
                return Err(TransformError::EmptyDrop(drop.item.clone()));
            }
        }
        Ok(())
    }

    /// `NaN` never meets a threshold.
    pub fn threshold_met(&self, temp_c: f32) -> bool {
        match self.mode {
            TransformMode::Cooling => temp_c <= self.threshold_c,
            TransformMode::Heating => temp_c >= self.threshold_c,
        }
    }

    pub fn gates_pass(&self, vessel: &VesselState) -> bool {
        let level = vessel.level;
        if self.required_level.is_some_and(|r| level != r) {
            return false;
        }
        if self.min_level.is_some_and(|m| level < m) {
            return false;
        }
        if self.max_level.is_some_and(|m| level > m) {
            return false;
        }
        match &self.requires_solid {
            Some(needed) => vessel.inserted_solid.as_ref() == Some(needed),
            None => true,
        }
    }

    pub fn matches(&self, vessel: &VesselState) -> bool {
        self.threshold_met(vessel.temp_c) && self.gates_pass(vessel)
    }

    fn output_level(&self, prior: u8) -> u8 {
        match self.level {
            LevelPolicy::KindDefault => self.set_kind.default_level(),
            LevelPolicy::Preserve => self.set_kind.clamp_level(prior),
            LevelPolicy::Set(level) => self.set_kind.clamp_level(level),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TransformRuleRegistryBuilder {
    rules: BTreeMap<VesselKind, Vec<ThermalTransform>>,
}

impl TransformRuleRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule for vessels of kind `from`. Order of calls is evaluation order.
    pub fn add(
        &mut self,
        from: VesselKind,
        rule: ThermalTransform,
    ) -> Result<&mut Self, TransformError> {
        rule.validate()?;
        self.rules.entry(from).or_default().push(rule);
        Ok(self)
    }

    pub fn build(self) -> TransformRuleRegistry {
        TransformRuleRegistry { rules: self.rules }
    }
}

/// Immutable ordered rule lists keyed by source kind.
#[derive(Debug, Clone, Default)]
pub struct TransformRuleRegistry {
    rules: BTreeMap<VesselKind, Vec<ThermalTransform>>,
}

impl TransformRuleRegistry {
    pub fn builder() -> TransformRuleRegistryBuilder {
        TransformRuleRegistryBuilder::new()
    }

    pub fn rules_for(&self, kind: VesselKind) -> &[ThermalTransform] {
        self.rules.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether some rule for `kind` waits on `solid`.
    pub fn wants_solid(&self, kind: VesselKind, solid: &Ident) -> bool {
        self.rules_for(kind)
            .iter()
            .any(|r| r.requires_solid.as_ref() == Some(solid))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// What a successful [`TransformRuleEngine::try_apply`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub rule_index: usize,
    pub from: VesselKind,
    pub to: VesselKind,
    /// Items to spawn in the world next to the vessel.
    pub spawned: Vec<ItemStack>,
    /// The caller must stop tracking the vessel.
    pub untrack: bool,
}

#[derive(Clone, Copy)]
pub struct TransformRuleEngine<'a> {
    rules: &'a TransformRuleRegistry,
    catalog: &'a dyn ItemCatalog,
}

impl<'a> TransformRuleEngine<'a> {
    pub fn new(rules: &'a TransformRuleRegistry, catalog: &'a dyn ItemCatalog) -> Self {
        Self { rules, catalog }
    }

    /// Apply the first matching rule for the vessel's current kind.
    ///
    /// Returns `None` and leaves the vessel untouched when nothing matches.
    /// Untracking is reported through [`TransformOutcome::untrack`]; the
    /// caller owns the tracking structure.
    pub fn try_apply(&self, vessel: &mut VesselState) -> Option<TransformOutcome> {
        if !vessel.is_thermally_initialized() {
            return None;
        }
        let from = vessel.kind;
        let (rule_index, rule) = self
            .rules_for_kind(from)
            .iter()
            .enumerate()
            .find(|(_, r)| r.matches(vessel))?;

        let prior_level = vessel.level;
        vessel.kind = rule.set_kind;
        vessel.level = rule.output_level(prior_level);

        let kind_changed = from != rule.set_kind;
        if kind_changed || rule.consume_solid || rule.reset_brew {
            vessel.inserted_solid = None;
        }
        if rule.reset_brew {
            vessel.clear_brew();
        }

        let mut spawned = Vec::new();
        if let Some(drop) = &rule.drop {
            let slot_free = vessel.inserted_solid.is_none()
                && vessel.kind.capabilities().accepts_solid;
            if slot_free && self.catalog.is_placeable(&drop.item) {
                vessel.inserted_solid = Some(drop.item.clone());
                if drop.count > 1 {
                    spawned.push(ItemStack::new(drop.item.clone(), drop.count - 1));
                }
            } else {
                spawned.push(drop.clone());
            }
        }

        log::debug!(
            "transform {from} -> {} (rule {rule_index}) at {:.2}C",
            rule.set_kind,
            vessel.temp_c
        );

        Some(TransformOutcome {
            rule_index,
            from,
            to: rule.set_kind,
            spawned,
            untrack: rule.untrack,
        })
    }

    fn rules_for_kind(&self, kind: VesselKind) -> &'a [ThermalTransform] {
        self.rules.rules_for(kind)
    }
}
