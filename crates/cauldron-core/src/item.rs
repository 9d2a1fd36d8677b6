//! Items as the engine sees them: stacks and an external catalog.

use crate::id::Ident;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A quantity of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Ident,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: Ident, count: u32) -> Self {
        Self { item, count }
    }

    pub fn one(item: Ident) -> Self {
        Self::new(item, 1)
    }
}

/// Read-only view of the host's item registry.
///
/// The engine never registers content; it asks this trait whether an item
/// exists, whether it can sit in a vessel as a solid and which tags it has.
pub trait ItemCatalog {
    /// Whether `item` is a known item.
    fn is_known(&self, item: &Ident) -> bool;

    /// Whether `item` represents a placeable solid (a block item).
    fn is_placeable(&self, item: &Ident) -> bool;

    /// Whether `item` is a member of `tag`.
    fn in_tag(&self, item: &Ident, tag: &Ident) -> bool;
}

/// A catalog backed by plain sets, built from data files or tests.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    items: BTreeSet<Ident>,
    placeable: BTreeSet<Ident>,
    tags: BTreeMap<Ident, BTreeSet<Ident>>,
    open: bool,
}

impl TagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog that treats every item as known. Tags and placeables still
    /// have to be declared.
    pub fn open() -> Self {
        Self {
            open: true,
            ..Self::default()
        }
    }

    pub fn add_item(&mut self, item: Ident) -> &mut Self {
        self.items.insert(item);
        self
    }

    pub fn add_placeable(&mut self, item: Ident) -> &mut Self {
        self.items.insert(item.clone());
        self.placeable.insert(item);
        self
    }

    pub fn add_to_tag(&mut self, tag: Ident, item: Ident) -> &mut Self {
        self.items.insert(item.clone());
        self.tags.entry(tag).or_default().insert(item);
        self
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

impl ItemCatalog for TagCatalog {
    fn is_known(&self, item: &Ident) -> bool {
        self.open || self.items.contains(item)
    }

    fn is_placeable(&self, item: &Ident) -> bool {
        self.placeable.contains(item)
    }

    fn in_tag(&self, item: &Ident, tag: &Ident) -> bool {
        self.tags.get(tag).is_some_and(|members| members.contains(item))
    }
}
