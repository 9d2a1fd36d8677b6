//! Heat sources: what sits under or around a vessel and how hard it heats.

use crate::id::Ident;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// HeatProfile
// ---------------------------------------------------------------------------

/// Target temperature a source can sustain and how fast it gets there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatProfile {
    max_temp_c: f32,
    approach_rate_c_per_tick: f32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeatProfileError {
    #[error("max_temp_c must be finite, got {0}")]
    NonFiniteMax(f32),
    #[error("approach rate must be finite and > 0, got {0}")]
    InvalidRate(f32),
}

impl HeatProfile {
    /// `max_temp_c` may be negative (chillers). The rate must be finite and positive.
    pub fn new(max_temp_c: f32, approach_rate_c_per_tick: f32) -> Result<Self, HeatProfileError> {
        if !max_temp_c.is_finite() {
            return Err(HeatProfileError::NonFiniteMax(max_temp_c));
        }
        if !approach_rate_c_per_tick.is_finite() || approach_rate_c_per_tick <= 0.0 {
            return Err(HeatProfileError::InvalidRate(approach_rate_c_per_tick));
        }
        Ok(Self {
            max_temp_c,
            approach_rate_c_per_tick,
        })
    }

    pub fn max_temp_c(&self) -> f32 {
        self.max_temp_c
    }

    pub fn approach_rate_c_per_tick(&self) -> f32 {
        self.approach_rate_c_per_tick
    }

    fn scaled(self, scale: f32) -> Self {
        Self {
            approach_rate_c_per_tick: self.approach_rate_c_per_tick * scale,
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// HeatContact
// ---------------------------------------------------------------------------

/// What the host world found next to a vessel this tick.
///
/// The engine never inspects world geometry; the tick driver fills this in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeatContact {
    /// Fluid directly below the vessel, if any.
    pub fluid: Option<Ident>,
    /// Block directly below the vessel, if any.
    pub block: Option<Ident>,
}

impl HeatContact {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn block(id: Ident) -> Self {
        Self {
            fluid: None,
            block: Some(id),
        }
    }

    pub fn fluid(id: Ident) -> Self {
        Self {
            fluid: Some(id),
            block: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Accumulates heat source definitions before freezing them.
#[derive(Debug, Clone)]
pub struct HeatSourceRegistryBuilder {
    blocks: BTreeMap<Ident, HeatProfile>,
    fluids: BTreeMap<Ident, HeatProfile>,
    rate_scale: f32,
}

impl Default for HeatSourceRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatSourceRegistryBuilder {
    pub fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
            fluids: BTreeMap::new(),
            rate_scale: 1.0,
        }
    }

    /// Register a block source. A later registration for the same id wins.
    pub fn register_block(&mut self, id: Ident, profile: HeatProfile) -> &mut Self {
        if self.blocks.insert(id.clone(), profile).is_some() {
            log::warn!("heat source block '{id}' defined twice; keeping the last definition");
        }
        self
    }

    pub fn register_fluid(&mut self, id: Ident, profile: HeatProfile) -> &mut Self {
        if self.fluids.insert(id.clone(), profile).is_some() {
            log::warn!("heat source fluid '{id}' defined twice; keeping the last definition");
        }
        self
    }

    /// Global multiplier applied to every approach rate at build time.
    ///
    /// Non-finite or non-positive values fall back to `1.0`.
    pub fn rate_scale(&mut self, scale: f32) -> &mut Self {
        if scale.is_finite() && scale > 0.0 {
            self.rate_scale = scale;
        } else {
            log::warn!("invalid heat_per_tick_scale {scale}; using 1.0");
            self.rate_scale = 1.0;
        }
        self
    }

    pub fn build(self) -> HeatSourceRegistry {
        let scale = self.rate_scale;
        HeatSourceRegistry {
            blocks: self
                .blocks
                .into_iter()
                .map(|(k, p)| (k, p.scaled(scale)))
                .collect(),
            fluids: self
                .fluids
                .into_iter()
                .map(|(k, p)| (k, p.scaled(scale)))
                .collect(),
        }
    }
}

/// Immutable lookup from source identity to [`HeatProfile`].
#[derive(Debug, Clone, Default)]
pub struct HeatSourceRegistry {
    blocks: BTreeMap<Ident, HeatProfile>,
    fluids: BTreeMap<Ident, HeatProfile>,
}

impl HeatSourceRegistry {
    pub fn builder() -> HeatSourceRegistryBuilder {
        HeatSourceRegistryBuilder::new()
    }

    pub fn block_profile(&self, id: &Ident) -> Option<HeatProfile> {
        self.blocks.get(id).copied()
    }

    pub fn fluid_profile(&self, id: &Ident) -> Option<HeatProfile> {
        self.fluids.get(id).copied()
    }

    /// Resolve a contact to a profile. A known fluid takes priority over the block.
    pub fn resolve(&self, contact: &HeatContact) -> Option<HeatProfile> {
        contact
            .fluid
            .as_ref()
            .and_then(|f| self.fluid_profile(f))
            .or_else(|| contact.block.as_ref().and_then(|b| self.block_profile(b)))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn fluid_count(&self) -> usize {
        self.fluids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.fluids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Ident {
        Ident::parse(s).unwrap()
    }

    #[test]
    fn profile_validation() {
        assert!(HeatProfile::new(-20.0, 0.5).is_ok());
        assert_eq!(
            HeatProfile::new(f32::INFINITY, 1.0),
            Err(HeatProfileError::NonFiniteMax(f32::INFINITY))
        );
        assert_eq!(
            HeatProfile::new(100.0, 0.0),
            Err(HeatProfileError::InvalidRate(0.0))
        );
        assert!(HeatProfile::new(100.0, -1.0).is_err());
        assert!(HeatProfile::new(100.0, f32::NAN).is_err());
    }

    #[test]
    fn fluid_beats_block() {
        let mut b = HeatSourceRegistry::builder();
        b.register_block(id("magma_block"), HeatProfile::new(120.0, 1.0).unwrap());
        b.register_fluid(id("lava"), HeatProfile::new(400.0, 4.0).unwrap());
        let reg = b.build();

        let both = HeatContact {
            fluid: Some(id("lava")),
            block: Some(id("magma_block")),
        };
        assert_eq!(reg.resolve(&both).unwrap().max_temp_c(), 400.0);

        let unknown_fluid = HeatContact {
            fluid: Some(id("water")),
            block: Some(id("magma_block")),
        };
        assert_eq!(reg.resolve(&unknown_fluid).unwrap().max_temp_c(), 120.0);
        assert!(reg.resolve(&HeatContact::none()).is_none());
    }

    #[test]
    fn rate_scale_multiplies_rates() {
        let mut b = HeatSourceRegistry::builder();
        b.register_block(id("campfire"), HeatProfile::new(150.0, 2.0).unwrap());
        b.rate_scale(2.5);
        let reg = b.build();
        let p = reg.block_profile(&id("campfire")).unwrap();
        assert_eq!(p.approach_rate_c_per_tick(), 5.0);
        assert_eq!(p.max_temp_c(), 150.0);
    }

    #[test]
    fn invalid_rate_scale_falls_back_to_one() {
        let mut b = HeatSourceRegistry::builder();
        b.register_block(id("campfire"), HeatProfile::new(150.0, 2.0).unwrap());
        b.rate_scale(-3.0);
        let reg = b.build();
        assert_eq!(
            reg.block_profile(&id("campfire"))
                .unwrap()
                .approach_rate_c_per_tick(),
            2.0
        );
    }
}
