//! Error types for package operations

use crate::typed::ModelError;
use docpack_markup::ParseError;
use thiserror::Error;

pub type PackageResult<T> = Result<T, PackageError>;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Malformed content in part {part}: {source}")]
    MalformedContent {
        part: String,
        #[source]
        source: ParseError,
    },

    #[error("Unknown part: {0}")]
    UnknownPart(String),

    #[error("Part already exists: {0}")]
    DuplicatePart(String),

    #[error("Cannot serialize part {part}: {message}")]
    Serialization { part: String, message: String },

    #[error("Typed model for part {part} could not be loaded: {source}")]
    InvalidModel {
        part: String,
        #[source]
        source: ModelError,
    },

    #[error("Part {part} has typed model edits that were not flushed")]
    PendingTypedEdits { part: String },

    #[error("Part {part} has tree edits that were not written back")]
    PendingTreeEdits { part: String },

    #[error("Part {part} is loaded as {loaded}, not {requested}")]
    ModelTypeMismatch {
        part: String,
        loaded: &'static str,
        requested: &'static str,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
