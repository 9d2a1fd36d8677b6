//! Vessel kinds and their capability table.
//!
//! Every behavioural difference between vessel variants is looked up here
//! instead of being spread across per-variant types.

use crate::id::{DEFAULT_NAMESPACE, Ident};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest fill level any vessel supports.
pub const MAX_LEVEL: u8 = 3;

/// The physical variant a vessel currently is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VesselKind {
    #[default]
    Empty,
    Water,
    Lava,
    PowderSnow,
    Frozen,
}

/// Static capabilities of a [`VesselKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindCapabilities {
    /// Whether the kind has graded fill levels (1..=MAX_LEVEL).
    pub supports_levels: bool,
    /// Whether ingredients may be brewed in it.
    pub brewable: bool,
    /// Whether the kind has a boil threshold at all.
    pub can_boil: bool,
    /// Whether the kind holds something that can take a resident solid.
    pub accepts_solid: bool,
    /// Level assigned when a transform switches to this kind without a level policy.
    pub default_level: u8,
}

impl VesselKind {
    pub const ALL: [VesselKind; 5] = [
        VesselKind::Empty,
        VesselKind::Water,
        VesselKind::Lava,
        VesselKind::PowderSnow,
        VesselKind::Frozen,
    ];

    pub fn capabilities(self) -> KindCapabilities {
        match self {
            VesselKind::Empty => KindCapabilities {
                supports_levels: false,
                brewable: false,
                can_boil: false,
                accepts_solid: true,
                default_level: 0,
            },
            VesselKind::Water => KindCapabilities {
                supports_levels: true,
                brewable: true,
                can_boil: true,
                accepts_solid: true,
                default_level: 1,
            },
            VesselKind::Lava => KindCapabilities {
                supports_levels: false,
                brewable: false,
                can_boil: true,
                accepts_solid: true,
                default_level: MAX_LEVEL,
            },
            VesselKind::PowderSnow => KindCapabilities {
                supports_levels: true,
                brewable: false,
                can_boil: false,
                accepts_solid: true,
                default_level: 1,
            },
            VesselKind::Frozen => KindCapabilities {
                supports_levels: true,
                brewable: false,
                can_boil: false,
                accepts_solid: false,
                default_level: 1,
            },
        }
    }

    pub fn supports_levels(self) -> bool {
        self.capabilities().supports_levels
    }

    pub fn is_brewable(self) -> bool {
        self.capabilities().brewable
    }

    pub fn default_level(self) -> u8 {
        self.capabilities().default_level
    }

    /// Clamp a requested level into the range this kind can hold.
    pub fn clamp_level(self, level: u8) -> u8 {
        match self {
            VesselKind::Empty => 0,
            k if k.supports_levels() => level.clamp(1, MAX_LEVEL),
            k => k.default_level(),
        }
    }

    /// The liquid identity recipes are keyed by, if the kind holds a liquid.
    pub fn liquid(self) -> Option<Ident> {
        let path = match self {
            VesselKind::Water => "water",
            VesselKind::Lava => "lava",
            VesselKind::PowderSnow => "powder_snow",
            VesselKind::Empty | VesselKind::Frozen => return None,
        };
        Some(Ident::literal(DEFAULT_NAMESPACE, path))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VesselKind::Empty => "empty",
            VesselKind::Water => "water",
            VesselKind::Lava => "lava",
            VesselKind::PowderSnow => "powder_snow",
            VesselKind::Frozen => "frozen",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vessel kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for VesselKind {
    type Err = UnknownKind;

    /// Accepts the snake_case name, optionally namespaced and with a
    /// `_cauldron` suffix (`minecraft:water_cauldron` is `water`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = trimmed.rsplit(':').next().unwrap_or(trimmed);
        let path = path.strip_suffix("_cauldron").unwrap_or(path);
        let kind = match path {
            "empty" | "cauldron" => VesselKind::Empty,
            "water" => VesselKind::Water,
            "lava" => VesselKind::Lava,
            "powder_snow" => VesselKind::PowderSnow,
            "frozen" | "ice" => VesselKind::Frozen,
            _ => return Err(UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}

impl fmt::Display for VesselKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
