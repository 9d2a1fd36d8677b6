//! Per-tick temperature model.
//!
//! A vessel's temperature walks toward a target by at most one step per
//! tick and stops on the target instead of overshooting it. With a heat
//! source the target is the source's ceiling scaled by the level's strength
//! bonus; without one the vessel drifts toward its kind's equilibrium.

use crate::config::{KindThermal, ThermalConfig};
use crate::heat::HeatProfile;
use crate::kind::VesselKind;
use crate::vessel::VesselState;

/// Strength and speed multipliers for one vessel this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelBonuses {
    /// Multiplies the source's `max_temp_c`.
    pub strength: f32,
    /// Multiplies the source's approach rate.
    pub speed: f32,
}

impl LevelBonuses {
    pub const NONE: LevelBonuses = LevelBonuses {
        strength: 1.0,
        speed: 1.0,
    };
}

/// Advances vessel temperatures using a borrowed [`ThermalConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ThermalSimulator<'a> {
    config: &'a ThermalConfig,
}

impl<'a> ThermalSimulator<'a> {
    pub fn new(config: &'a ThermalConfig) -> Self {
        Self { config }
    }

    pub fn bonuses_for(&self, level: u8) -> LevelBonuses {
        LevelBonuses {
            strength: self.config.strength_bonus.for_level(level),
            speed: self.config.speed_bonus.for_level(level),
        }
    }

    /// Starting temperature for a freshly filled vessel of `kind`.
    pub fn baseline(&self, kind: VesselKind, ambient_c: f32) -> f32 {
        self.config.for_kind(kind).baseline_c.unwrap_or(ambient_c)
    }

    /// Seed `temp_c` and `last_temp_c` if the vessel is uninitialized.
    /// Returns `true` when seeding happened.
    pub fn initialize(&self, vessel: &mut VesselState, ambient_c: f32) -> bool {
        if vessel.is_thermally_initialized() {
            return false;
        }
        let base = self.baseline(vessel.kind, ambient_c);
        vessel.temp_c = base;
        vessel.last_temp_c = base;
        true
    }

    /// Advance one tick and return the new temperature.
    ///
    /// Seeds an uninitialized vessel first, then applies one step. Also
    /// refreshes `last_temp_c` and the `boiling` flag.
    pub fn advance(
        &self,
        vessel: &mut VesselState,
        heat: Option<HeatProfile>,
        ambient_c: f32,
        bonuses: LevelBonuses,
    ) -> f32 {
        self.initialize(vessel, ambient_c);
        let kind_cfg = self.config.for_kind(vessel.kind);

        vessel.last_temp_c = vessel.temp_c;
        vessel.temp_c = step_toward(vessel.temp_c, heat, ambient_c, bonuses, kind_cfg);
        vessel.boiling = self.is_boiling(vessel, heat, bonuses);
        vessel.temp_c
    }

    /// Whether the vessel boils right now.
    ///
    /// Reaching the boil point is not enough when the kind requires a source:
    /// the source must also be able to hold the vessel at the boil point.
    pub fn is_boiling(
        &self,
        vessel: &VesselState,
        heat: Option<HeatProfile>,
        bonuses: LevelBonuses,
    ) -> bool {
        if !vessel.kind.capabilities().can_boil || !vessel.is_thermally_initialized() {
            return false;
        }
        let kind_cfg = self.config.for_kind(vessel.kind);
        let Some(boil) = kind_cfg.boil_point_c else {
            return false;
        };
        let hot_enough = vessel.temp_c >= boil - self.config.boil_epsilon_c;
        if !kind_cfg.boil_requires_source {
            return hot_enough;
        }
        let sustained = heat.is_some_and(|h| h.max_temp_c() * bonuses.strength >= boil);
        hot_enough && sustained
    }
}

fn step_toward(
    temp: f32,
    heat: Option<HeatProfile>,
    ambient_c: f32,
    bonuses: LevelBonuses,
    kind_cfg: &KindThermal,
) -> f32 {
    let (target, step) = match heat {
        Some(h) => (
            h.max_temp_c() * bonuses.strength,
            h.approach_rate_c_per_tick() * bonuses.speed,
        ),
        None => {
            let eq = kind_cfg.equilibrium_c.unwrap_or(ambient_c);
            if eq > temp && !kind_cfg.passive_warming {
                return temp;
            }
            (eq, kind_cfg.passive_rate_c_per_tick)
        }
    };
    if !step.is_finite() || step <= 0.0 || !target.is_finite() {
        return temp;
    }
    if temp < target {
        (temp + step).min(target)
    } else {
        (temp - step).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::VesselKind;

    fn water(level: u8) -> VesselState {
        VesselState::with_contents(VesselKind::Water, level)
    }

    fn profile(max: f32, rate: f32) -> Option<HeatProfile> {
        Some(HeatProfile::new(max, rate).unwrap())
    }

    #[test]
    fn first_advance_seeds_from_ambient_then_steps() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        let mut v = water(3);
        let t = sim.advance(&mut v, profile(150.0, 5.0), 12.0, LevelBonuses::NONE);
        assert_eq!(t, 17.0);
        assert_eq!(v.last_temp_c, 12.0);
    }

    #[test]
    fn twenty_ticks_of_heat() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        let mut v = water(3);
        for _ in 0..20 {
            sim.advance(&mut v, profile(150.0, 5.0), 12.0, LevelBonuses::NONE);
        }
        assert_eq!(v.temp_c, 112.0);
    }

    #[test]
    fn clamps_at_target() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        let mut v = water(3);
        v.temp_c = 148.0;
        sim.advance(&mut v, profile(150.0, 5.0), 12.0, LevelBonuses::NONE);
        assert_eq!(v.temp_c, 150.0);
        sim.advance(&mut v, profile(150.0, 5.0), 12.0, LevelBonuses::NONE);
        assert_eq!(v.temp_c, 150.0);
    }

    #[test]
    fn negative_source_cools() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        let mut v = water(3);
        v.temp_c = 2.0;
        sim.advance(&mut v, profile(-20.0, 1.5), 12.0, LevelBonuses::NONE);
        assert_eq!(v.temp_c, 0.5);
    }

    #[test]
    fn kind_baselines() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        assert_eq!(sim.baseline(VesselKind::Water, 12.0), 12.0);
        assert_eq!(sim.baseline(VesselKind::PowderSnow, 12.0), -10.0);
        assert_eq!(sim.baseline(VesselKind::Lava, 12.0), 1000.0);
        assert_eq!(sim.baseline(VesselKind::Empty, 25.0), 25.0);
    }

    #[test]
    fn passive_drift_only_cools_by_default() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);

        let mut hot = water(3);
        hot.temp_c = 50.0;
        sim.advance(&mut hot, None, 12.0, LevelBonuses::NONE);
        assert!(hot.temp_c < 50.0);
        assert!(hot.temp_c >= 12.0);

        let mut cold = water(3);
        cold.temp_c = 0.0;
        sim.advance(&mut cold, None, 12.0, LevelBonuses::NONE);
        assert_eq!(cold.temp_c, 0.0);
    }

    #[test]
    fn passive_warming_when_enabled() {
        let mut cfg = ThermalConfig::default();
        cfg.water.passive_warming = true;
        cfg.water.passive_rate_c_per_tick = 1.0;
        let sim = ThermalSimulator::new(&cfg);
        let mut v = water(3);
        v.temp_c = 0.0;
        sim.advance(&mut v, None, 12.0, LevelBonuses::NONE);
        assert_eq!(v.temp_c, 1.0);
    }

    #[test]
    fn level_bonuses_raise_ceiling_and_rate() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        let bonuses = sim.bonuses_for(1);
        assert_eq!(bonuses.strength, 1.25);
        let mut v = water(1);
        v.temp_c = 99.0;
        for _ in 0..100 {
            sim.advance(&mut v, profile(100.0, 1.0), 12.0, bonuses);
        }
        assert_eq!(v.temp_c, 125.0);
    }

    #[test]
    fn boiling_needs_temperature_and_capable_source() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        let mut v = water(3);
        v.temp_c = 100.0;
        assert!(sim.is_boiling(&v, profile(150.0, 1.0), LevelBonuses::NONE));
        // cached temperature with the source gone
        assert!(!sim.is_boiling(&v, None, LevelBonuses::NONE));
        // source too weak to hold the boil
        assert!(!sim.is_boiling(&v, profile(90.0, 1.0), LevelBonuses::NONE));
        // weak source boosted by strength bonus
        let boosted = LevelBonuses {
            strength: 1.25,
            speed: 1.0,
        };
        assert!(sim.is_boiling(&v, profile(90.0, 1.0), boosted));
        v.temp_c = 99.0;
        assert!(!sim.is_boiling(&v, profile(150.0, 1.0), LevelBonuses::NONE));
    }

    #[test]
    fn non_boiling_kinds_never_boil() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        let mut v = VesselState::with_contents(VesselKind::PowderSnow, 3);
        v.temp_c = 500.0;
        assert!(!sim.is_boiling(&v, profile(600.0, 1.0), LevelBonuses::NONE));
    }

    #[test]
    fn uninitialized_vessel_does_not_boil() {
        let cfg = ThermalConfig::default();
        let sim = ThermalSimulator::new(&cfg);
        let v = water(3);
        assert!(!sim.is_boiling(&v, profile(150.0, 1.0), LevelBonuses::NONE));
    }
}
