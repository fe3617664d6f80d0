//! Ordered, id-keyed entry list shared by the cart and the wishlist.

use storefront_core::{Entity, position_of};

/// Insertion-ordered entries with at most one entry per id.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryList<E> {
    entries: Vec<E>,
}

impl<E> Default for EntryList<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: Entity> EntryList<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted entries, keeping the first entry for each id.
    pub fn from_loaded(loaded: impl IntoIterator<Item = E>) -> Self {
        let mut list = Self::new();
        let mut dropped = 0usize;
        for entry in loaded {
            if !list.insert(entry) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::warn!(dropped, "dropped duplicate entries from persisted record");
        }
        list
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        position_of(&self.entries, id).map(|i| &self.entries[i])
    }

    pub fn get_mut(&mut self, id: &E::Id) -> Option<&mut E> {
        position_of(&self.entries, id).map(move |i| &mut self.entries[i])
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        position_of(&self.entries, id).is_some()
    }

    /// Append `entry` unless its id is already present. Returns whether it was added.
    pub fn insert(&mut self, entry: E) -> bool {
        if self.contains(entry.id()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, id: &E::Id) -> Option<E> {
        position_of(&self.entries, id).map(|i| self.entries.remove(i))
    }

    /// Drop everything. Returns whether anything was dropped.
    pub fn clear(&mut self) -> bool {
        let had_entries = !self.entries.is_empty();
        self.entries.clear();
        had_entries
    }

    pub fn as_slice(&self) -> &[E] {
        &self.entries
    }

    pub fn iter(&self) -> core::slice::Iter<'_, E> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
