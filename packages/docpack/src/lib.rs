//! # Docpack
//!
//! Keeps two views of every part in a package consistent with the part's
//! bytes: a strongly-typed model for structural edits and a generic markup
//! tree for bulk transformations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐          ┌──────────────────────┐
//! │ TypedModelAdapter    │          │ PartCacheRegistry    │
//! │  load / flush /      │          │  get_or_create_tree  │
//! │  reload              │          │  invalidate / write  │
//! └──────────┬───────────┘          └──────────┬───────────┘
//!            │ serialize      BackingStore      │ parse / serialize
//!            └──────────────▶  (bytes)  ◀───────┘
//!                               ▲
//!            enter_tree_session / exit_tree_session
//! ```
//!
//! ## Core Principles
//!
//! 1. **Bytes are authoritative between boundaries**: both views derive from them
//! 2. **Trees are never re-parsed implicitly**: only invalidation drops them
//! 3. **One dirty side at a time**: opening the other side while edits are
//!    pending is rejected
//! 4. **No hidden state**: caches live in the package and die with it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docpack::Package;
//!
//! // Typed edit
//! package.get_typed_model::<WordDocument>(main)?.body.push_paragraph("First");
//!
//! // Switch to the tree view
//! package.enter_tree_session()?;
//! let mut tree = package.get_tree(main)?;
//! tree.find_mut("w:body").unwrap().add_child(paragraph);
//! drop(tree);
//! package.put_tree(main)?;
//!
//! // Back to the typed view
//! package.exit_tree_session(None)?;
//! ```

mod cache;
mod config;
mod error;
pub mod logging;
mod package;
mod part;
mod session;
mod snapshot;
mod state;
mod store;
mod typed;

pub use cache::{PartCacheRegistry, TreeCacheEntry, TreeHandle};
pub use config::PackageConfig;
pub use error::{PackageError, PackageResult};
pub use package::Package;
pub use part::{Part, PartId};
pub use state::{IllegalTransition, PartState, PartStatus, Transition};
pub use store::BackingStore;
pub use typed::{ModelError, TypedHandle, TypedModel, TypedModelAdapter};

// Re-export the tree crate for convenience
pub use docpack_markup;
pub use docpack_markup::{Document as TreeDocument, Element, Node};
