//! Tunable engine constants.
//!
//! Every field carries a serde default so a partial `engine` data file only
//! overrides what it names.

use crate::id::Ident;
use crate::kind::VesselKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Thermal
// ---------------------------------------------------------------------------

/// Thermal behaviour of one vessel kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindThermal {
    /// Temperature a fresh vessel starts at. `None` means the current ambient.
    pub baseline_c: Option<f32>,
    /// Temperature drifted toward with no heat source. `None` means ambient.
    pub equilibrium_c: Option<f32>,
    /// Passive drift per tick without a heat source.
    pub passive_rate_c_per_tick: f32,
    /// Whether passive drift may raise the temperature.
    pub passive_warming: bool,
    /// Boil threshold, if the kind can boil.
    pub boil_point_c: Option<f32>,
    /// Whether boiling also needs a source whose boosted max reaches the boil point.
    pub boil_requires_source: bool,
}

impl Default for KindThermal {
    fn default() -> Self {
        Self {
            baseline_c: None,
            equilibrium_c: None,
            passive_rate_c_per_tick: 0.05,
            passive_warming: false,
            boil_point_c: None,
            boil_requires_source: true,
        }
    }
}

/// Multipliers indexed by fill level. Index 0 is used for level 0 and for
/// any level past the end of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBonus(pub Vec<f32>);

impl LevelBonus {
    pub fn for_level(&self, level: u8) -> f32 {
        self.0
            .get(level as usize)
            .or_else(|| self.0.first())
            .copied()
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    pub empty: KindThermal,
    pub water: KindThermal,
    pub lava: KindThermal,
    pub powder_snow: KindThermal,
    pub frozen: KindThermal,
    /// Raises the ceiling (`max_temp_c`) of a heat source per fill level.
    pub strength_bonus: LevelBonus,
    /// Raises the approach rate of a heat source per fill level.
    pub speed_bonus: LevelBonus,
    /// Slack applied when comparing a temperature against a boil point.
    pub boil_epsilon_c: f32,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            empty: KindThermal::default(),
            water: KindThermal {
                boil_point_c: Some(100.0),
                ..KindThermal::default()
            },
            lava: KindThermal {
                baseline_c: Some(1000.0),
                boil_point_c: Some(1000.0),
                passive_rate_c_per_tick: 0.5,
                ..KindThermal::default()
            },
            powder_snow: KindThermal {
                baseline_c: Some(-10.0),
                ..KindThermal::default()
            },
            frozen: KindThermal {
                baseline_c: Some(-10.0),
                ..KindThermal::default()
            },
            strength_bonus: LevelBonus(vec![1.0, 1.25, 1.10, 1.0]),
            speed_bonus: LevelBonus(vec![1.0, 1.66, 1.33, 1.0]),
            boil_epsilon_c: 0.001,
        }
    }
}

impl ThermalConfig {
    pub fn for_kind(&self, kind: VesselKind) -> &KindThermal {
        match kind {
            VesselKind::Empty => &self.empty,
            VesselKind::Water => &self.water,
            VesselKind::Lava => &self.lava,
            VesselKind::PowderSnow => &self.powder_snow,
            VesselKind::Frozen => &self.frozen,
        }
    }
}

// ---------------------------------------------------------------------------
// Brewing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewingConfig {
    /// Ingredients are only accepted while the vessel is boiling.
    pub require_boiling: bool,
    /// Item handed out when a doomed brew is extracted.
    pub doomed_output: Ident,
}

impl Default for BrewingConfig {
    fn default() -> Self {
        Self {
            require_boiling: true,
            doomed_output: Ident::literal("crookedcraft", "doomed_sludge"),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thermal: ThermalConfig,
    pub brewing: BrewingConfig,
}
