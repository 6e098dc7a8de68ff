//! # Part Cache Registry
//!
//! Package-scoped table of parsed trees, one entry per part at most.
//!
//! An entry is parsed once from the part's bytes and then returned as-is on
//! every read until it is invalidated, even when the bytes change underneath
//! it. Only the session boundaries decide when the bytes are read again.

use crate::part::PartId;
use crate::store::BackingStore;
use docpack_markup::{parse, Document, ParseError, SerializeError, Serializer};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// Cached tree of one part
#[derive(Debug, Clone)]
pub struct TreeCacheEntry {
    tree: Document,
    dirty: bool,
    generation: u64,
    checksum: u32,
}

impl TreeCacheEntry {
    fn new(tree: Document, store: &BackingStore) -> Self {
        Self {
            tree,
            dirty: false,
            generation: store.generation(),
            checksum: store.checksum(),
        }
    }

    pub fn tree(&self) -> &Document {
        &self.tree
    }

    /// Written through a handle since it was parsed or last written back
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Store generation this tree was parsed from or written to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}

#[derive(Debug, Default)]
pub struct PartCacheRegistry {
    entries: HashMap<PartId, TreeCacheEntry>,
}

impl PartCacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached tree for `part`, parsing `store` only when no entry exists.
    pub fn get_or_create_tree(
        &mut self,
        part: PartId,
        store: &BackingStore,
    ) -> Result<&mut TreeCacheEntry, ParseError> {
        if !self.entries.contains_key(&part) {
            let tree = parse(store.bytes())?;
            tracing::debug!(
                "[TreeCache] parsed {} ({} bytes, generation {})",
                part,
                store.len(),
                store.generation()
            );
            self.entries.insert(part, TreeCacheEntry::new(tree, store));
        } else {
            tracing::trace!("[TreeCache] hit {}", part);
        }

        match self.entries.get_mut(&part) {
            Some(entry) => Ok(entry),
            None => unreachable!("entry inserted above"),
        }
    }

    pub fn get(&self, part: PartId) -> Option<&TreeCacheEntry> {
        self.entries.get(&part)
    }

    pub fn is_cached(&self, part: PartId) -> bool {
        self.entries.contains_key(&part)
    }

    pub fn is_dirty(&self, part: PartId) -> bool {
        self.entries.get(&part).is_some_and(TreeCacheEntry::is_dirty)
    }

    /// The bytes were replaced after the cached tree was taken from them
    pub fn is_stale(&self, part: PartId, store: &BackingStore) -> bool {
        self.entries
            .get(&part)
            .is_some_and(|entry| entry.generation != store.generation())
    }

    /// Remove the entry for `part`, returning it.
    pub fn invalidate(&mut self, part: PartId) -> Option<TreeCacheEntry> {
        let removed = self.entries.remove(&part);
        if removed.is_some() {
            tracing::debug!("[TreeCache] invalidated {}", part);
        }
        removed
    }

    /// Forget that the part's tree was edited, keeping the tree as it is.
    ///
    /// Returns whether the entry was dirty.
    pub(crate) fn clear_dirty(&mut self, part: PartId) -> bool {
        match self.entries.get_mut(&part) {
            Some(entry) if entry.dirty => {
                entry.dirty = false;
                true
            }
            _ => false,
        }
    }

    /// Invalidate every listed part. Returns the parts whose dirty trees were
    /// dropped without being written back.
    pub fn invalidate_all(&mut self, parts: impl IntoIterator<Item = PartId>) -> Vec<PartId> {
        parts
            .into_iter()
            .filter_map(|part| self.invalidate(part).filter(TreeCacheEntry::is_dirty).map(|_| part))
            .collect()
    }

    /// Serialize `tree` into `store` and cache it as the part's clean entry.
    pub fn write_back(
        &mut self,
        part: PartId,
        tree: Document,
        store: &mut BackingStore,
        serializer: &Serializer,
    ) -> Result<(), SerializeError> {
        let text = serializer.serialize(&tree)?;
        store.replace(text.into_bytes());
        self.entries.insert(part, TreeCacheEntry::new(tree, store));
        tracing::debug!("[TreeCache] wrote back {} (generation {})", part, store.generation());
        Ok(())
    }

    /// Serialize the cached entry of `part` into `store`.
    ///
    /// Returns `false` when nothing is cached for the part.
    pub fn write_back_cached(
        &mut self,
        part: PartId,
        store: &mut BackingStore,
        serializer: &Serializer,
    ) -> Result<bool, SerializeError> {
        let Some(entry) = self.entries.get_mut(&part) else {
            return Ok(false);
        };

        let text = serializer.serialize(&entry.tree)?;
        store.replace(text.into_bytes());
        entry.dirty = false;
        entry.generation = store.generation();
        entry.checksum = store.checksum();
        tracing::debug!("[TreeCache] wrote back {} (generation {})", part, store.generation());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Access to a cached tree; mutable access marks the entry dirty
pub struct TreeHandle<'a> {
    entry: &'a mut TreeCacheEntry,
}

impl<'a> TreeHandle<'a> {
    pub(crate) fn new(entry: &'a mut TreeCacheEntry) -> Self {
        Self { entry }
    }

    pub fn is_dirty(&self) -> bool {
        self.entry.dirty
    }

    pub fn generation(&self) -> u64 {
        self.entry.generation
    }
}

impl Deref for TreeHandle<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.entry.tree
    }
}

impl DerefMut for TreeHandle<'_> {
    fn deref_mut(&mut self) -> &mut Document {
        self.entry.dirty = true;
        &mut self.entry.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docpack_markup::Element;

    fn part(index: usize) -> PartId {
        PartId::new(0, index)
    }

    #[test]
    fn test_get_or_create_parses_once() {
        let mut registry = PartCacheRegistry::new();
        let mut store = BackingStore::new(b"<a>one</a>".to_vec());

        let first = registry.get_or_create_tree(part(0), &store).unwrap().tree().clone();
        store.replace(b"<a>two</a>".to_vec());
        let second = registry.get_or_create_tree(part(0), &store).unwrap().tree().clone();

        assert_eq!(first, second);
        assert_eq!(second.root.value(), "one");
        assert!(registry.is_stale(part(0), &store));
    }

    #[test]
    fn test_invalidate_forces_reparse() {
        let mut registry = PartCacheRegistry::new();
        let mut store = BackingStore::new(b"<a>one</a>".to_vec());

        registry.get_or_create_tree(part(0), &store).unwrap();
        store.replace(b"<a>two</a>".to_vec());

        assert!(registry.invalidate(part(0)).is_some());
        assert!(registry.invalidate(part(0)).is_none());

        let entry = registry.get_or_create_tree(part(0), &store).unwrap();
        assert_eq!(entry.tree().root.value(), "two");
        assert_eq!(entry.generation(), 1);
    }

    #[test]
    fn test_malformed_store_is_not_cached() {
        let mut registry = PartCacheRegistry::new();
        let store = BackingStore::new(b"<a>".to_vec());

        assert!(registry.get_or_create_tree(part(0), &store).is_err());
        assert!(!registry.is_cached(part(0)));
    }

    #[test]
    fn test_handle_marks_dirty_only_on_write() {
        let mut registry = PartCacheRegistry::new();
        let store = BackingStore::new(b"<a/>".to_vec());

        let mut handle = TreeHandle::new(registry.get_or_create_tree(part(0), &store).unwrap());
        assert_eq!(handle.root.name, "a");
        assert!(!handle.is_dirty());

        handle.root.add_text("x");
        assert!(handle.is_dirty());
        assert!(registry.is_dirty(part(0)));
    }

    #[test]
    fn test_write_back_keeps_entry_cached_and_clean() {
        let mut registry = PartCacheRegistry::new();
        let mut store = BackingStore::new(b"<a/>".to_vec());
        let serializer = Serializer::new();

        let mut handle = TreeHandle::new(registry.get_or_create_tree(part(0), &store).unwrap());
        handle.root.add_child(Element::new("b"));

        assert!(registry.write_back_cached(part(0), &mut store, &serializer).unwrap());
        assert_eq!(store.bytes(), b"<a><b/></a>");
        assert!(registry.is_cached(part(0)));
        assert!(!registry.is_dirty(part(0)));
        assert!(!registry.is_stale(part(0), &store));
    }

    #[test]
    fn test_failed_write_back_leaves_store_untouched() {
        let mut registry = PartCacheRegistry::new();
        let mut store = BackingStore::new(b"<a/>".to_vec());

        let bad = Document::new(Element::new("not valid"));
        let result = registry.write_back(part(0), bad, &mut store, &Serializer::new());

        assert!(result.is_err());
        assert_eq!(store.bytes(), b"<a/>");
        assert_eq!(store.generation(), 0);
        assert!(!registry.is_cached(part(0)));
    }

    #[test]
    fn test_write_back_cached_without_entry() {
        let mut registry = PartCacheRegistry::new();
        let mut store = BackingStore::new(b"<a/>".to_vec());

        assert!(!registry.write_back_cached(part(0), &mut store, &Serializer::new()).unwrap());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_clear_dirty_keeps_tree() {
        let mut registry = PartCacheRegistry::new();
        let store = BackingStore::new(b"<a/>".to_vec());

        let mut handle = TreeHandle::new(registry.get_or_create_tree(part(0), &store).unwrap());
        handle.root.add_text("kept");

        assert!(registry.clear_dirty(part(0)));
        assert!(!registry.clear_dirty(part(0)));
        assert!(!registry.clear_dirty(part(1)));
        assert!(!registry.is_dirty(part(0)));
        assert_eq!(registry.get(part(0)).unwrap().tree().root.value(), "kept");
        assert_eq!(store.bytes(), b"<a/>");
    }

    #[test]
    fn test_invalidate_all_reports_dirty_entries() {
        let mut registry = PartCacheRegistry::new();
        let store = BackingStore::new(b"<a/>".to_vec());

        registry.get_or_create_tree(part(0), &store).unwrap();
        let mut handle = TreeHandle::new(registry.get_or_create_tree(part(1), &store).unwrap());
        handle.root.set_attribute("k", "v");

        let discarded = registry.invalidate_all([part(0), part(1), part(2)]);
        assert_eq!(discarded, vec![part(1)]);
        assert!(registry.is_empty());
    }
}
