//! # Typed Model Adapter
//!
//! Bridges a strongly-typed object model to a part's backing store.
//!
//! The model is loaded from the store on first access and kept until the
//! adapter is reloaded. Mutable access through a [`TypedHandle`] marks the
//! instance as having pending edits; `flush` writes those edits back.

use crate::store::BackingStore;
use docpack_markup::{ParseError, SerializeError};
use std::any::{type_name, Any};
use std::fmt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Errors reported by a typed model implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Unexpected structure: {0}")]
    Structure(String),
}

/// Contract a strongly-typed object model offers to the package
pub trait TypedModel: Any + Sized {
    /// Build a fresh instance from part bytes
    fn deserialize_from(bytes: &[u8]) -> Result<Self, ModelError>;

    /// Write the current in-memory state into `sink`
    fn serialize_to(&self, sink: &mut Vec<u8>) -> Result<(), ModelError>;
}

/// Type-erased live instance
trait LiveModel: Any {
    fn serialize_into(&self, sink: &mut Vec<u8>) -> Result<(), ModelError>;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn model_type(&self) -> &'static str;
}

impl<M: TypedModel> LiveModel for M {
    fn serialize_into(&self, sink: &mut Vec<u8>) -> Result<(), ModelError> {
        self.serialize_to(sink)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn model_type(&self) -> &'static str {
        type_name::<M>()
    }
}

/// Per-part holder of the live typed model
#[derive(Default)]
pub struct TypedModelAdapter {
    instance: Option<Box<dyn LiveModel>>,
    pending: bool,
    stale: bool,
}

impl fmt::Debug for TypedModelAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedModelAdapter")
            .field("model", &self.loaded_type())
            .field("pending", &self.pending)
            .field("stale", &self.stale)
            .finish()
    }
}

impl TypedModelAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_materialized(&self) -> bool {
        self.instance.is_some()
    }

    /// Edits made through a handle since the last flush
    pub fn has_pending_edits(&self) -> bool {
        self.pending
    }

    /// The store was rewritten from the tree side after this instance loaded
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Type name of the live instance, if any
    pub fn loaded_type(&self) -> Option<&'static str> {
        self.instance.as_ref().map(|model| model.model_type())
    }

    /// Materialize the model from the store if it is not live yet.
    pub fn load<M: TypedModel>(&mut self, store: &BackingStore) -> Result<(), ModelError> {
        if self.instance.is_none() {
            let model = M::deserialize_from(store.bytes())?;
            self.instance = Some(Box::new(model));
            self.pending = false;
            self.stale = false;
        }
        Ok(())
    }

    /// Handle over the live instance, `None` if not loaded or of another type.
    pub fn handle<M: TypedModel>(&mut self) -> Option<TypedHandle<'_, M>> {
        let model = self.instance.as_mut()?.as_any_mut().downcast_mut::<M>()?;
        Some(TypedHandle {
            model,
            pending: &mut self.pending,
        })
    }

    /// Serialize pending edits into the store.
    ///
    /// Returns whether the store was written. The store keeps its previous
    /// bytes when serialization fails.
    pub fn flush(&mut self, store: &mut BackingStore) -> Result<bool, ModelError> {
        let model = match &self.instance {
            Some(model) if self.pending => model,
            _ => return Ok(false),
        };

        let mut sink = Vec::new();
        model.serialize_into(&mut sink)?;
        store.replace(sink);
        self.pending = false;
        Ok(true)
    }

    /// Drop the live instance so the next access re-derives it from the store.
    ///
    /// Returns whether unflushed edits were discarded.
    pub fn reload(&mut self) -> bool {
        let discarded = self.instance.is_some() && self.pending;
        self.instance = None;
        self.pending = false;
        self.stale = false;
        discarded
    }

    pub(crate) fn mark_stale(&mut self) {
        if self.instance.is_some() {
            self.stale = true;
        }
    }
}

/// Access to a part's typed model; mutable access marks pending edits
pub struct TypedHandle<'a, M> {
    model: &'a mut M,
    pending: &'a mut bool,
}

impl<M> TypedHandle<'_, M> {
    pub fn has_pending_edits(&self) -> bool {
        *self.pending
    }
}

impl<M> Deref for TypedHandle<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        &*self.model
    }
}

impl<M> DerefMut for TypedHandle<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        *self.pending = true;
        &mut *self.model
    }
}
