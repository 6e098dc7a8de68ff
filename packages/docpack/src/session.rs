//! # Session Boundaries
//!
//! A tree session is the stretch between [`Package::enter_tree_session`] and
//! [`Package::exit_tree_session`] during which the tree representation is
//! used. The boundaries move edits from one representation to the other
//! through the bytes:
//!
//! ```text
//! enter: typed ──flush──▶ bytes   then drop every cached tree
//! exit:  tree ──(put_tree)──▶ bytes   then drop every live typed model
//! ```
//!
//! Tree edits only reach the bytes through `put_tree` unless the package is
//! configured with `write_back_on_exit`. Without it, exit leaves a dirty tree
//! cached as it is but no longer dirty: tree reads keep seeing the edits,
//! the typed model reloads the bytes without them, and the next
//! `enter_tree_session` drops them.

use crate::error::PackageResult;
use crate::package::Package;
use crate::part::PartId;
use docpack_markup::Serializer;

impl Package {
    /// Flush every typed model, then invalidate every cached tree.
    ///
    /// Afterwards tree reads on any part see all typed edits made so far.
    /// Calling it again is harmless.
    pub fn enter_tree_session(&mut self) -> PackageResult<()> {
        let ids: Vec<PartId> = self.part_ids().collect();

        let mut flushed = 0;
        for &id in &ids {
            if self.flush(id)? {
                flushed += 1;
            }
        }

        let discarded = self.cache.invalidate_all(ids.iter().copied());
        if self.config.warn_on_discard {
            for id in &discarded {
                tracing::warn!(
                    "[Session] entering tree session dropped unwritten tree edits in {}",
                    self.part(*id)?.name()
                );
            }
        }

        self.in_tree_session = true;
        tracing::info!(
            "[Session] entered tree session: {} part(s), {} flushed",
            ids.len(),
            flushed
        );
        Ok(())
    }

    /// Reload typed models from the bytes for `parts`, or for every part.
    ///
    /// Only an exit over every part closes the session.
    ///
    /// Dirty trees are written back first when `write_back_on_exit` is set.
    /// Otherwise they stay cached and their edits never reach the bytes or
    /// the typed model.
    pub fn exit_tree_session(&mut self, parts: Option<&[PartId]>) -> PackageResult<()> {
        let ids: Vec<PartId> = match parts {
            Some(subset) => subset.to_vec(),
            None => self.part_ids().collect(),
        };
        for &id in &ids {
            self.part(id)?;
        }

        let serializer = Serializer::new();
        let mut written = 0;
        for &id in &ids {
            if self.cache.is_dirty(id) {
                if self.config.write_back_on_exit {
                    self.put_tree_with(id, &serializer)?;
                    written += 1;
                } else {
                    self.cache.clear_dirty(id);
                    if self.config.warn_on_discard {
                        tracing::warn!(
                            "[Session] exiting tree session left tree edits in {} out of the bytes",
                            self.part(id)?.name()
                        );
                    }
                }
            }
            self.reload(id)?;
        }

        if parts.is_none() {
            self.in_tree_session = false;
        }
        tracing::info!(
            "[Session] exited tree session: {} part(s) reloaded, {} written back",
            ids.len(),
            written
        );
        Ok(())
    }

    /// Run `f` inside a tree session over `parts` (every part when `None`).
    ///
    /// The session is not exited when `f` fails.
    pub fn with_tree_session<T>(
        &mut self,
        parts: Option<&[PartId]>,
        f: impl FnOnce(&mut Package) -> PackageResult<T>,
    ) -> PackageResult<T> {
        self.enter_tree_session()?;
        let value = f(self)?;
        self.exit_tree_session(parts)?;
        Ok(value)
    }
}
