use thiserror::Error;

/// Structural problems in a main document part
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WmlError {
    #[error("expected root <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: &'static str, found: String },

    #[error("document has no <{0}>")]
    MissingBody(&'static str),
}

impl From<WmlError> for docpack::ModelError {
    fn from(err: WmlError) -> Self {
        docpack::ModelError::Structure(err.to_string())
    }
}
