use crate::store::BackingStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a part: owning package plus arena index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId {
    pub(crate) package: u32,
    pub(crate) index: usize,
}

impl PartId {
    pub(crate) fn new(package: u32, index: usize) -> Self {
        Self { package, index }
    }

    /// Position of the part in its package
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part#{}", self.index)
    }
}

/// Named unit of content
#[derive(Debug)]
pub struct Part {
    name: String,
    content_type: String,
    pub(crate) store: BackingStore,
}

impl Part {
    pub(crate) fn new(name: String, content_type: String, bytes: Vec<u8>) -> Self {
        Self {
            name,
            content_type,
            store: BackingStore::new(bytes),
        }
    }

    /// Part name, e.g. `/word/document.xml`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn store(&self) -> &BackingStore {
        &self.store
    }
}
