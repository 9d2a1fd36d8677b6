//! Data file mechanics: format detection, discovery and parsing.
//!
//! Every section file is parsed into a [`serde_json::Value`] regardless of
//! its on-disk format, so the entry-level validation in
//! [`cauldron_core::data_loader`] is shared by RON, TOML and JSON.

use serde_json::Value;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that fail a whole section file. Bad entries inside an otherwise
/// readable file are warnings, not errors.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("{file}: not a .ron, .toml or .json file")]
    UnsupportedFormat { file: PathBuf },

    /// The same section exists in more than one format.
    #[error("section defined twice: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("{file} does not parse: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The file parsed but its overall shape is wrong.
    #[error("invalid section in {file}: {source}")]
    Section {
        file: PathBuf,
        source: cauldron_core::data_loader::DataLoadError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

/// Pick the parser from the file extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|f| Some(f.extension()) == ext)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Locate `<section>.{ron,toml,json}` in `dir`.
///
/// A section present in two formats is an error rather than a silent pick.
pub fn find_data_file(dir: &Path, section: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|f| dir.join(format!("{section}.{}", f.extension())))
        .filter(|path| path.is_file());

    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (first, _) => Ok(first),
    }
}

// ===========================================================================
// Parsing
// ===========================================================================

/// Parse `content` in `format` into a generic value.
pub fn parse_str(content: &str, format: Format, file: &Path) -> Result<Value, DataLoadError> {
    let parsed = match format {
        Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|detail| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    })
}

/// Read a file and parse it according to its extension.
pub fn read_value(path: &Path) -> Result<Value, DataLoadError> {
    let format = detect_format(path)?;
    parse_str(&std::fs::read_to_string(path)?, format, path)
}

// ===========================================================================
// Tests
// ===========================================================================
