use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier '{0}' has more than one ':' separator")]
    TooManySeparators(String),
    #[error("identifier '{id}' has an empty {part}")]
    EmptyPart { id: String, part: &'static str },
    #[error("identifier '{id}' contains invalid character {ch:?}")]
    InvalidChar { id: String, ch: char },
}

// ---------------------------------------------------------------------------
// Ident
// ---------------------------------------------------------------------------

/// A namespaced content identifier such as `minecraft:water` or
/// `crookedcraft:doomed_sludge`.
///
/// Always stored in canonical `namespace:path` form; a bare `path` is parsed
/// into the [`DEFAULT_NAMESPACE`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ident {
    full: String,
    split: usize,
}

impl Ident {
    /// Parse an identifier, filling in the default namespace when absent.
    pub fn parse(raw: &str) -> Result<Self, IdentError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(IdentError::Empty);
        }
        let (namespace, path) = match raw.split_once(':') {
            Some((ns, path)) => {
                if path.contains(':') {
                    return Err(IdentError::TooManySeparators(raw.to_string()));
                }
                (ns, path)
            }
            None => (DEFAULT_NAMESPACE, raw),
        };
        if namespace.is_empty() {
            return Err(IdentError::EmptyPart {
                id: raw.to_string(),
                part: "namespace",
            });
        }
        if path.is_empty() {
            return Err(IdentError::EmptyPart {
                id: raw.to_string(),
                part: "path",
            });
        }
        if let Some(ch) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(IdentError::InvalidChar {
                id: raw.to_string(),
                ch,
            });
        }
        if let Some(ch) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(IdentError::InvalidChar {
                id: raw.to_string(),
                ch,
            });
        }
        Ok(Self {
            full: format!("{namespace}:{path}"),
            split: namespace.len(),
        })
    }

    /// Build from parts known to be valid at compile time.
    pub(crate) fn literal(namespace: &str, path: &str) -> Self {
        debug_assert!(Self::parse(&format!("{namespace}:{path}")).is_ok());
        Self {
            full: format!("{namespace}:{path}"),
            split: namespace.len(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.full[..self.split]
    }

    pub fn path(&self) -> &str {
        &self.full[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl FromStr for Ident {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ident {
    type Error = IdentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ident> for String {
    fn from(value: Ident) -> Self {
        value.full
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

// ---------------------------------------------------------------------------
// VesselKey
// ---------------------------------------------------------------------------

/// Position key of a tracked vessel, packed into a single `i64`.
///
/// Layout: 26 bits of x, 26 bits of z, 12 bits of y (two's complement per
/// field). Keys order by their packed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VesselKey(pub i64);

const XZ_BITS: u32 = 26;
const Y_BITS: u32 = 12;
const XZ_MASK: i64 = (1 << XZ_BITS) - 1;
const Y_MASK: i64 = (1 << Y_BITS) - 1;

impl VesselKey {
    pub fn from_xyz(x: i32, y: i32, z: i32) -> Self {
        let packed = ((x as i64 & XZ_MASK) << (XZ_BITS + Y_BITS))
            | ((z as i64 & XZ_MASK) << Y_BITS)
            | (y as i64 & Y_MASK);
        Self(packed)
    }

    pub fn x(self) -> i32 {
        (self.0 >> (XZ_BITS + Y_BITS)) as i32
    }

    pub fn y(self) -> i32 {
        ((self.0 << (64 - Y_BITS)) >> (64 - Y_BITS)) as i32
    }

    pub fn z(self) -> i32 {
        ((self.0 << (64 - XZ_BITS - Y_BITS)) >> (64 - XZ_BITS)) as i32
    }

    pub fn to_xyz(self) -> (i32, i32, i32) {
        (self.x(), self.y(), self.z())
    }
}

impl fmt::Display for VesselKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.to_xyz();
        write!(f, "({x}, {y}, {z})")
    }
}
