//! # Part State Machine
//!
//! ```text
//!            typed edit                    tree edit
//!   TypedDirty ◀────────── Clean ──────────▶ TreeDirty
//!        │    flush / reload ▲  write-back /    │
//!        └───────────────────┘  invalidate ─────┘
//! ```
//!
//! The state is derived from the typed adapter's pending flag and the tree
//! entry's dirty flag. At most one side may hold edits the bytes do not
//! have, so opening the other side for editing is rejected.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartState {
    /// Bytes hold the newest content
    Clean,
    /// The typed model has edits not yet flushed
    TypedDirty,
    /// The cached tree has edits not yet written back
    TreeDirty,
}

/// Operations that move a part between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    TypedEdit,
    TreeEdit,
    Flush,
    WriteBack,
    Invalidate,
    Reload,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{transition:?} is not allowed while the part is {state:?}")]
pub struct IllegalTransition {
    pub state: PartState,
    pub transition: Transition,
}

impl PartState {
    pub fn from_flags(typed_pending: bool, tree_dirty: bool) -> Self {
        debug_assert!(
            !(typed_pending && tree_dirty),
            "typed and tree edits pending on the same part"
        );
        match (typed_pending, tree_dirty) {
            (true, _) => PartState::TypedDirty,
            (false, true) => PartState::TreeDirty,
            (false, false) => PartState::Clean,
        }
    }

    /// Reject transitions that would leave both sides holding edits.
    pub fn check(self, transition: Transition) -> Result<(), IllegalTransition> {
        let illegal = matches!(
            (self, transition),
            (PartState::TypedDirty, Transition::TreeEdit)
                | (PartState::TypedDirty, Transition::WriteBack)
                | (PartState::TreeDirty, Transition::TypedEdit)
        );

        if illegal {
            Err(IllegalTransition {
                state: self,
                transition,
            })
        } else {
            Ok(())
        }
    }

    /// State after a legal transition
    pub fn after(self, transition: Transition) -> PartState {
        match (self, transition) {
            (_, Transition::TypedEdit) => PartState::TypedDirty,
            (_, Transition::TreeEdit) => PartState::TreeDirty,
            (PartState::TypedDirty, Transition::Flush) => PartState::Clean,
            (PartState::TypedDirty, Transition::Reload) => PartState::Clean,
            (PartState::TreeDirty, Transition::WriteBack) => PartState::Clean,
            (PartState::TreeDirty, Transition::Invalidate) => PartState::Clean,
            (state, _) => state,
        }
    }
}

/// Diagnostic snapshot of one part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartStatus {
    pub state: PartState,
    /// A typed model instance is live
    pub typed_materialized: bool,
    /// The live typed model predates a tree write-back
    pub typed_stale: bool,
    pub tree_cached: bool,
    /// The cached tree predates the current bytes
    pub tree_stale: bool,
}
