//! Persistence of the vessel store.
//!
//! Two forms are supported:
//!
//! - **Records**: a flat list of [`VesselRecord`]s, written as JSON. Every
//!   field except the position is optional on load, so older or partial
//!   files load with the defaults a freshly tracked vessel would have.
//! - **Snapshot**: the whole store as bitcode behind a versioned
//!   [`SnapshotHeader`].
//!
//! Both paths run loaded vessels through the same normalization, so the
//! in-memory invariants hold no matter what was on disk.

use crate::engine::Engine;
use crate::id::{Ident, VesselKey};
use crate::kind::VesselKind;
use crate::vessel::VesselState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a vessel store snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xCA1D_0001;

/// Current snapshot format version.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One persisted ingredient entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub id: String,
    #[serde(default)]
    pub count: u32,
}

/// Flat, order-independent persisted form of one vessel.
///
/// Identifiers are kept as strings so a single malformed entry degrades to a
/// dropped field instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselRecord {
    pub pos: VesselKey,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_temp_c: Option<f32>,
    #[serde(default)]
    pub doomed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_recipe_id: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_solid: Option<String>,
}

impl VesselRecord {
    pub fn from_state(key: VesselKey, vessel: &VesselState) -> Self {
        let finite = |t: f32| t.is_finite().then_some(t);
        Self {
            pos: key,
            kind: vessel.kind.as_str().to_string(),
            level: vessel.level,
            temp_c: finite(vessel.temp_c),
            last_temp_c: finite(vessel.last_temp_c),
            doomed: vessel.is_doomed(),
            matched_recipe_id: vessel.matched_recipe_id().map(|id| id.to_string()),
            ingredients: vessel
                .ingredients()
                .iter()
                .map(|(id, &count)| IngredientRecord {
                    id: id.to_string(),
                    count,
                })
                .collect(),
            inserted_solid: vessel.inserted_solid.as_ref().map(|id| id.to_string()),
        }
    }

    /// Rebuild the in-memory state.
    ///
    /// Unknown kinds load as empty; malformed identifiers are dropped with a
    /// warning.
    pub fn to_state(&self) -> VesselState {
        let pos = self.pos;
        let kind = if self.kind.is_empty() {
            VesselKind::Empty
        } else {
            self.kind.parse().unwrap_or_else(|_| {
                log::warn!("vessel at {pos}: unknown kind '{}', loading as empty", self.kind);
                VesselKind::Empty
            })
        };

        let mut vessel = VesselState::new();
        vessel.kind = kind;
        vessel.level = self.level;
        vessel.temp_c = self.temp_c.unwrap_or(f32::NAN);
        vessel.last_temp_c = self.last_temp_c.unwrap_or(f32::NAN);

        let mut ingredients = BTreeMap::new();
        for entry in &self.ingredients {
            let id = match Ident::parse(&entry.id) {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("vessel at {pos}: dropping ingredient: {e}");
                    continue;
                }
            };
            let total = ingredients.entry(id).or_insert(0u32);
            match total.checked_add(entry.count) {
                Some(sum) => *total = sum,
                None => log::warn!(
                    "vessel at {pos}: dropping ingredient entry '{}': count overflows",
                    entry.id
                ),
            }
        }
        vessel.set_ingredients(ingredients);

        vessel.inserted_solid = self
            .inserted_solid
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| match Ident::parse(s) {
                Ok(id) => Some(id),
                Err(e) => {
                    log::warn!("vessel at {pos}: dropping solid: {e}");
                    None
                }
            });

        if self.doomed {
            vessel.doom();
        } else if let Some(raw) = self.matched_recipe_id.as_deref() {
            match Ident::parse(raw) {
                Ok(id) => vessel.set_matched(id),
                Err(e) => log::warn!("vessel at {pos}: dropping recipe match: {e}"),
            }
        }

        normalize(&mut vessel);
        vessel
    }
}

/// Restore invariants on state that came from outside the engine.
fn normalize(vessel: &mut VesselState) {
    if !vessel.temp_c.is_finite() {
        vessel.temp_c = f32::NAN;
        vessel.last_temp_c = f32::NAN;
    } else if !vessel.last_temp_c.is_finite() {
        vessel.last_temp_c = f32::NAN;
    }
    // A leveled kind at level 0 holds nothing.
    if vessel.kind.supports_levels() && vessel.level == 0 {
        vessel.empty_out();
    }
    vessel.level = vessel.kind.clamp_level(vessel.level);
    if vessel.is_doomed() && vessel.matched_recipe_id().is_some() {
        vessel.clear_match();
    }
    // Boiling is derived; the next tick recomputes it.
    vessel.boiling = false;
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Engine tick at the time the snapshot was taken.
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), PersistError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(PersistError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(PersistError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    header: SnapshotHeader,
    vessels: Vec<(VesselKey, VesselState)>,
}

// ---------------------------------------------------------------------------
// Engine persistence methods
// ---------------------------------------------------------------------------

impl Engine {
    /// Every tracked vessel as a record, in key order.
    pub fn to_records(&self) -> Vec<VesselRecord> {
        self.store
            .iter()
            .map(|(key, vessel)| VesselRecord::from_state(key, vessel))
            .collect()
    }

    /// Replace the store with `records`. Later duplicates of a position win.
    /// Returns the number of vessels now tracked.
    pub fn load_records(&mut self, records: &[VesselRecord]) -> usize {
        self.store
            .replace_all(records.iter().map(|r| (r.pos, r.to_state())));
        log::info!("loaded {} vessel records", self.store.len());
        self.store.len()
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(&self.to_records())?)
    }

    pub fn load_json(&mut self, json: &str) -> Result<usize, PersistError> {
        let records: Vec<VesselRecord> = serde_json::from_str(json)?;
        Ok(self.load_records(&records))
    }

    /// Serialize the whole store to a binary blob via bitcode.
    pub fn save_snapshot(&self) -> Result<Vec<u8>, PersistError> {
        let snapshot = StoreSnapshot {
            header: SnapshotHeader::new(self.tick),
            vessels: self
                .store
                .iter()
                .map(|(key, vessel)| (key, vessel.clone()))
                .collect(),
        };
        bitcode::serialize(&snapshot).map_err(|e| PersistError::Encode(e.to_string()))
    }

    /// Replace the store and tick counter from a snapshot.
    ///
    /// The header is validated before anything is replaced; on error the
    /// engine is untouched.
    pub fn load_snapshot(&mut self, data: &[u8]) -> Result<usize, PersistError> {
        let snapshot: StoreSnapshot =
            bitcode::deserialize(data).map_err(|e| PersistError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        self.tick = snapshot.header.tick;
        self.store
            .replace_all(snapshot.vessels.into_iter().map(|(key, mut vessel)| {
                normalize(&mut vessel);
                (key, vessel)
            }));
        Ok(self.store.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::kind::MAX_LEVEL;

    fn brewing_vessel() -> VesselState {
        let mut v = VesselState::with_contents(VesselKind::Water, 3);
        v.temp_c = 42.5;
        v.last_temp_c = 40.0;
        v.add_ingredient(id("x"));
        v.add_ingredient(id("x"));
        v.set_matched(id("r1"));
        v
    }

    #[test]
    fn record_round_trip_is_field_for_field() {
        let v = brewing_vessel();
        let record = VesselRecord::from_state(key(3), &v);
        let json = serde_json::to_string(&record).unwrap();
        let back: VesselRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_state(), v);
    }

    #[test]
    fn nan_temperatures_are_omitted() {
        let v = VesselState::with_contents(VesselKind::Water, 1);
        let json = serde_json::to_string(&VesselRecord::from_state(key(0), &v)).unwrap();
        assert!(!json.contains("temp_c"));
        assert!(!json.contains("inserted_solid"));
    }

    #[test]
    fn missing_fields_load_as_fresh_vessel() {
        let pos = key(0).0;
        let record: VesselRecord = serde_json::from_str(&format!("{{\"pos\": {pos}}}")).unwrap();
        assert_eq!(record.to_state(), VesselState::new());
    }

    #[test]
    fn load_tolerates_bad_entries() {
        let record = VesselRecord {
            pos: key(0),
            kind: "minecraft:water_cauldron".to_string(),
            level: 9,
            temp_c: Some(f32::INFINITY),
            last_temp_c: Some(5.0),
            doomed: false,
            matched_recipe_id: None,
            ingredients: vec![
                IngredientRecord {
                    id: "sugar".to_string(),
                    count: 0,
                },
                IngredientRecord {
                    id: "bad id".to_string(),
                    count: 2,
                },
                IngredientRecord {
                    id: "redstone".to_string(),
                    count: 1,
                },
            ],
            inserted_solid: Some(String::new()),
        };
        let v = record.to_state();
        assert_eq!(v.kind, VesselKind::Water);
        assert_eq!(v.level, MAX_LEVEL);
        assert!(!v.is_thermally_initialized());
        assert!(v.last_temp_c.is_nan());
        assert_eq!(v.ingredients().len(), 1);
        assert_eq!(v.ingredients()[&id("redstone")], 1);
        assert!(v.inserted_solid.is_none());
    }

    #[test]
    fn duplicate_ingredient_counts_never_overflow() {
        let json = r#"{"pos": 0, "kind": "water", "level": 3, "ingredients": [
            {"id": "x", "count": 4294967295},
            {"id": "minecraft:x", "count": 1},
            {"id": "y", "count": 2},
            {"id": "minecraft:y", "count": 3}
        ]}"#;
        let record: VesselRecord = serde_json::from_str(json).unwrap();
        let v = record.to_state();
        assert_eq!(v.ingredients()[&id("x")], u32::MAX);
        assert_eq!(v.ingredients()[&id("y")], 5);
    }

    #[test]
    fn leveled_kind_at_level_zero_loads_empty() {
        for kind in ["water", "powder_snow"] {
            let record = VesselRecord {
                kind: kind.to_string(),
                level: 0,
                temp_c: Some(30.0),
                last_temp_c: Some(30.0),
                matched_recipe_id: Some("r1".to_string()),
                ..VesselRecord::from_state(key(0), &brewing_vessel())
            };
            let v = record.to_state();
            assert_eq!(v.kind, VesselKind::Empty);
            assert_eq!(v.level, 0);
            assert!(!v.has_brew());
        }
    }

    #[test]
    fn doomed_wins_over_match() {
        let record = VesselRecord {
            doomed: true,
            matched_recipe_id: Some("r1".to_string()),
            ..VesselRecord::from_state(key(0), &brewing_vessel())
        };
        let v = record.to_state();
        assert!(v.is_doomed());
        assert!(v.matched_recipe_id().is_none());
    }

    #[test]
    fn engine_json_round_trip() {
        let mut engine = test_engine();
        engine.store_mut().insert(key(0), brewing_vessel());
        engine.fill(key(1), VesselKind::Lava, None);
        let json = engine.to_json().unwrap();

        let mut restored = test_engine();
        assert_eq!(restored.load_json(&json).unwrap(), 2);
        assert_eq!(restored.store().get(key(0)), Some(&brewing_vessel()));
        assert_eq!(restored.store().get(key(1)).unwrap().kind, VesselKind::Lava);
        assert!(restored.store().dirty().is_membership_dirty());
    }

    #[test]
    fn snapshot_round_trip() {
        let mut engine = test_engine();
        engine.store_mut().insert(key(0), brewing_vessel());
        engine.store_mut().ensure_tracked(key(5));
        run_ticks(&mut engine, &FakeWorld::new(), 12.0, 3);
        let data = engine.save_snapshot().unwrap();

        let mut restored = test_engine();
        assert_eq!(restored.load_snapshot(&data).unwrap(), 2);
        assert_eq!(restored.current_tick(), 3);
        for (key, vessel) in engine.store().iter() {
            let mut expected = vessel.clone();
            expected.boiling = false;
            assert_eq!(restored.store().get(key), Some(&expected));
        }
    }

    #[test]
    fn header_validation() {
        assert!(SnapshotHeader::new(0).validate().is_ok());

        let mut h = SnapshotHeader::new(0);
        h.magic = 0xDEAD_BEEF;
        assert!(matches!(h.validate(), Err(PersistError::InvalidMagic(0xDEAD_BEEF))));

        let mut h = SnapshotHeader::new(0);
        h.version = FORMAT_VERSION + 1;
        assert!(matches!(h.validate(), Err(PersistError::FutureVersion(_))));

        let mut h = SnapshotHeader::new(0);
        h.version = 0;
        assert!(matches!(h.validate(), Err(PersistError::UnsupportedVersion(0))));
    }

    #[test]
    fn garbage_snapshot_is_an_error() {
        let mut engine = test_engine();
        engine.store_mut().ensure_tracked(key(0));
        assert!(matches!(
            engine.load_snapshot(&[1, 2, 3]),
            Err(PersistError::Decode(_))
        ));
        assert!(engine.store().is_tracked(key(0)));
    }
}
