//! Whole-package snapshots
//!
//! A snapshot captures every part's name, content type and persisted bytes.
//! Live typed models are flushed first; cached trees that were never written
//! back are not part of the bytes and so are not captured.

use crate::config::PackageConfig;
use crate::error::PackageResult;
use crate::package::Package;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct PackageSnapshot {
    parts: Vec<PartSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PartSnapshot {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl Package {
    /// Save, then encode every part into one buffer.
    pub fn to_bytes(&mut self) -> PackageResult<Vec<u8>> {
        self.save()?;

        let mut parts = Vec::with_capacity(self.len());
        self.for_each_part(|_, part| {
            parts.push(PartSnapshot {
                name: part.name().to_string(),
                content_type: part.content_type().to_string(),
                bytes: part.store().bytes().to_vec(),
            });
        });

        Ok(serde_json::to_vec(&PackageSnapshot { parts })?)
    }

    /// Open a package from a buffer produced by [`Package::to_bytes`].
    pub fn from_bytes(bytes: &[u8], config: PackageConfig) -> PackageResult<Self> {
        let snapshot: PackageSnapshot = serde_json::from_slice(bytes)?;

        let mut package = Package::with_config(config);
        for part in snapshot.parts {
            package.add_part(part.name, part.content_type, part.bytes)?;
        }
        Ok(package)
    }
}
