//! Qualified element names of the main document part

pub const DOCUMENT: &str = "w:document";
pub const BODY: &str = "w:body";
pub const P: &str = "w:p";
pub const R: &str = "w:r";
pub const T: &str = "w:t";
pub const P_PR: &str = "w:pPr";
pub const R_PR: &str = "w:rPr";

/// Namespace declaration written on the document root
pub const XMLNS_W: (&str, &str) = (
    "xmlns:w",
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
);
