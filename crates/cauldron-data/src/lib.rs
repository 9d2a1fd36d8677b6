//! Loads cauldron registries from a data directory of RON, TOML or JSON
//! files, with per-section fall-back on reload.

pub mod game_data;
pub mod loader;

pub use game_data::{GameData, LoadReport, load_game_data, reload_game_data};
pub use loader::DataLoadError;
