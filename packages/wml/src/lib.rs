//! # Docpack WML
//!
//! Word-processing main document model for docpack packages.
//!
//! Reads `w:document/w:body/w:p/w:r/w:t` into [`WordDocument`] and writes it
//! back. Root attributes, `w:pPr` and `w:rPr` are carried through a flush
//! unchanged. Body children other than paragraphs are kept too, but are
//! written after all paragraphs. Any other child of `w:p` or `w:r`
//! (hyperlinks, bookmarks, field codes) is not modelled and is lost on flush.

mod document;
mod error;
pub mod names;

pub use document::{Body, Paragraph, Run, WordDocument};
pub use error::WmlError;

/// `w` namespace element names
pub use names as w;

use docpack::{Package, PackageConfig, PackageResult, PartId, TypedModel};

/// Part name of the main document
pub const MAIN_DOCUMENT_PART: &str = "/word/document.xml";

pub const MAIN_DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// New package holding a main document part with an empty body.
pub fn create_empty_document(config: PackageConfig) -> PackageResult<(Package, PartId)> {
    let mut bytes = Vec::new();
    WordDocument::default()
        .serialize_to(&mut bytes)
        .map_err(|source| docpack::PackageError::InvalidModel {
            part: MAIN_DOCUMENT_PART.to_string(),
            source,
        })?;

    let mut package = Package::with_config(config);
    let main = package.add_part(MAIN_DOCUMENT_PART, MAIN_DOCUMENT_CONTENT_TYPE, bytes)?;
    tracing::debug!("[Wml] created empty document as {}", main);
    Ok((package, main))
}
