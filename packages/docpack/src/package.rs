//! # Package
//!
//! Ordered set of parts, each with its backing store, an optional live typed
//! model and at most one cached tree.
//!
//! ## Lifecycle
//!
//! ```text
//! open ─▶ edit (typed | tree) ─▶ boundary ─▶ edit ─▶ ... ─▶ save ─▶ drop
//! ```
//!
//! The package takes `&mut self` for every operation that touches a part, so
//! a single editing session owns it at a time. Callers sharing a package
//! across threads wrap it in one exclusive lock.

use crate::cache::{PartCacheRegistry, TreeHandle};
use crate::config::PackageConfig;
use crate::error::{PackageError, PackageResult};
use crate::part::{Part, PartId};
use crate::state::{PartState, PartStatus, Transition};
use crate::typed::{TypedHandle, TypedModel, TypedModelAdapter};
use docpack_markup::{Document, Serializer};
use std::any::type_name;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_PACKAGE_ID: AtomicU32 = AtomicU32::new(0);

/// Editable, multi-part document
#[derive(Debug)]
pub struct Package {
    id: u32,
    parts: Vec<Part>,
    names: HashMap<String, PartId>,
    pub(crate) typed: Vec<TypedModelAdapter>,
    pub(crate) cache: PartCacheRegistry,
    pub(crate) config: PackageConfig,
    pub(crate) in_tree_session: bool,
}

impl Package {
    pub fn new() -> Self {
        Self::with_config(PackageConfig::default())
    }

    pub fn with_config(config: PackageConfig) -> Self {
        Self {
            id: NEXT_PACKAGE_ID.fetch_add(1, Ordering::Relaxed),
            parts: Vec::new(),
            names: HashMap::new(),
            typed: Vec::new(),
            cache: PartCacheRegistry::new(),
            config,
            in_tree_session: false,
        }
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Add a part holding `bytes`.
    pub fn add_part(
        &mut self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> PackageResult<PartId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(PackageError::DuplicatePart(name));
        }

        let id = PartId::new(self.id, self.parts.len());
        tracing::debug!("[Package] added {} as {} ({} bytes)", name, id, bytes.len());
        self.names.insert(name.clone(), id);
        self.parts.push(Part::new(name, content_type.into(), bytes));
        self.typed.push(TypedModelAdapter::new());
        Ok(id)
    }

    pub fn part_by_name(&self, name: &str) -> PackageResult<PartId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| PackageError::UnknownPart(name.to_string()))
    }

    /// Part behind `id`. Ids handed out by another package are unknown here.
    pub fn part(&self, id: PartId) -> PackageResult<&Part> {
        if id.package != self.id {
            return Err(PackageError::UnknownPart(id.to_string()));
        }
        self.parts
            .get(id.index)
            .ok_or_else(|| PackageError::UnknownPart(id.to_string()))
    }

    pub fn part_ids(&self) -> impl Iterator<Item = PartId> {
        let package = self.id;
        (0..self.parts.len()).map(move |index| PartId::new(package, index))
    }

    pub fn for_each_part(&self, mut f: impl FnMut(PartId, &Part)) {
        for (index, part) in self.parts.iter().enumerate() {
            f(PartId::new(self.id, index), part);
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Current persisted bytes of a part
    pub fn part_bytes(&self, id: PartId) -> PackageResult<&[u8]> {
        Ok(self.part(id)?.store.bytes())
    }

    pub fn part_state(&self, id: PartId) -> PackageResult<PartState> {
        self.part(id)?;
        Ok(PartState::from_flags(
            self.typed[id.index].has_pending_edits(),
            self.cache.is_dirty(id),
        ))
    }

    pub fn part_status(&self, id: PartId) -> PackageResult<PartStatus> {
        let part = self.part(id)?;
        let adapter = &self.typed[id.index];
        Ok(PartStatus {
            state: self.part_state(id)?,
            typed_materialized: adapter.is_materialized(),
            typed_stale: adapter.is_stale(),
            tree_cached: self.cache.is_cached(id),
            tree_stale: self.cache.is_stale(id, &part.store),
        })
    }

    pub fn is_in_tree_session(&self) -> bool {
        self.in_tree_session
    }

    /// Reject `transition` when the other representation holds edits.
    fn check(&self, id: PartId, transition: Transition) -> PackageResult<PartState> {
        let state = self.part_state(id)?;
        state.check(transition).map_err(|illegal| {
            let part = self.parts[id.index].name().to_string();
            match illegal.state {
                PartState::TypedDirty => PackageError::PendingTypedEdits { part },
                _ => PackageError::PendingTreeEdits { part },
            }
        })?;
        Ok(state)
    }

    // Tree representation

    /// Cached tree of a part, parsed from its bytes on first access.
    ///
    /// The same tree is returned until the part is invalidated, whatever
    /// happened to the bytes in between.
    pub fn get_tree(&mut self, id: PartId) -> PackageResult<TreeHandle<'_>> {
        self.check(id, Transition::TreeEdit)?;

        let part = &self.parts[id.index];
        let entry = self
            .cache
            .get_or_create_tree(id, &part.store)
            .map_err(|source| PackageError::MalformedContent {
                part: part.name().to_string(),
                source,
            })?;
        Ok(TreeHandle::new(entry))
    }

    /// Write the part's cached tree to its bytes.
    ///
    /// The tree stays cached. A live typed model is now stale and keeps its
    /// old content until it is reloaded.
    pub fn put_tree(&mut self, id: PartId) -> PackageResult<()> {
        self.put_tree_with(id, &Serializer::new())
    }

    /// Like [`Package::put_tree`] with indented output.
    pub fn put_tree_formatted(&mut self, id: PartId) -> PackageResult<()> {
        let serializer = self.config.formatting_serializer();
        self.put_tree_with(id, &serializer)
    }

    pub(crate) fn put_tree_with(&mut self, id: PartId, serializer: &Serializer) -> PackageResult<()> {
        let before = self.check(id, Transition::WriteBack)?;

        let part = &mut self.parts[id.index];
        let written = self
            .cache
            .write_back_cached(id, &mut part.store, serializer)
            .map_err(|e| PackageError::Serialization {
                part: part.name().to_string(),
                message: e.to_string(),
            })?;

        if written {
            self.typed[id.index].mark_stale();
        } else {
            tracing::debug!("[Package] put_tree on {} with nothing cached", part.name());
        }
        debug_assert_eq!(self.part_state(id)?, before.after(Transition::WriteBack));
        Ok(())
    }

    /// Write `tree` to the part's bytes and cache it as the part's tree.
    pub fn replace_tree(&mut self, id: PartId, tree: Document) -> PackageResult<()> {
        self.check(id, Transition::WriteBack)?;

        let part = &mut self.parts[id.index];
        self.cache
            .write_back(id, tree, &mut part.store, &Serializer::new())
            .map_err(|e| PackageError::Serialization {
                part: part.name().to_string(),
                message: e.to_string(),
            })?;
        self.typed[id.index].mark_stale();
        Ok(())
    }

    /// Drop the part's cached tree. Returns whether one was cached.
    pub fn invalidate_tree(&mut self, id: PartId) -> PackageResult<bool> {
        self.part(id)?;
        Ok(self.cache.invalidate(id).is_some())
    }

    // Typed representation

    /// Live typed model of a part, loaded from its bytes on first access.
    pub fn get_typed_model<M: TypedModel>(&mut self, id: PartId) -> PackageResult<TypedHandle<'_, M>> {
        self.check(id, Transition::TypedEdit)?;

        let part = &self.parts[id.index];
        let adapter = &mut self.typed[id.index];
        if let Some(loaded) = adapter.loaded_type() {
            if loaded != type_name::<M>() {
                return Err(PackageError::ModelTypeMismatch {
                    part: part.name().to_string(),
                    loaded,
                    requested: type_name::<M>(),
                });
            }
        }

        adapter
            .load::<M>(&part.store)
            .map_err(|source| PackageError::InvalidModel {
                part: part.name().to_string(),
                source,
            })?;

        match adapter.handle::<M>() {
            Some(handle) => Ok(handle),
            None => unreachable!("model of the requested type was loaded above"),
        }
    }

    /// Serialize the part's pending typed edits into its bytes.
    ///
    /// Returns whether anything was written. The cached tree, if any, is
    /// left alone.
    pub fn flush(&mut self, id: PartId) -> PackageResult<bool> {
        let before = self.part_state(id)?;

        let part = &mut self.parts[id.index];
        let written = self.typed[id.index]
            .flush(&mut part.store)
            .map_err(|e| PackageError::Serialization {
                part: part.name().to_string(),
                message: e.to_string(),
            })?;

        if written {
            tracing::debug!(
                "[Package] flushed {} (generation {})",
                part.name(),
                part.store.generation()
            );
        }
        debug_assert_eq!(self.part_state(id)?, before.after(Transition::Flush));
        Ok(written)
    }

    /// Discard the part's live typed model. Returns whether unflushed edits
    /// were lost.
    pub fn reload(&mut self, id: PartId) -> PackageResult<bool> {
        self.part(id)?;
        let discarded = self.typed[id.index].reload();
        if discarded && self.config.warn_on_discard {
            tracing::warn!(
                "[Package] reload dropped unflushed typed edits in {}",
                self.parts[id.index].name()
            );
        }
        Ok(discarded)
    }

    /// Flush every part's typed model.
    pub fn save(&mut self) -> PackageResult<()> {
        let ids: Vec<PartId> = self.part_ids().collect();
        for id in ids {
            self.flush(id)?;
        }
        Ok(())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}
