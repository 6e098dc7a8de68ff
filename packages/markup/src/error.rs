use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

pub type SerializeResult<T> = Result<T, SerializeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Content is not valid UTF-8 at byte {pos}")]
    InvalidEncoding { pos: usize },

    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of content at {pos}")]
    UnexpectedEof { pos: usize },

    #[error("Mismatched closing tag at {pos}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unknown entity at {pos}: &{entity};")]
    UnknownEntity { pos: usize, entity: String },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },

    #[error("Lexer error at {pos}")]
    LexerError { pos: usize },
}

impl ParseError {
    pub fn unexpected_token(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    pub fn lexer_error(pos: usize) -> Self {
        Self::LexerError { pos }
    }

    /// Byte offset the error points at
    pub fn pos(&self) -> usize {
        match self {
            Self::InvalidEncoding { pos }
            | Self::UnexpectedToken { pos, .. }
            | Self::UnexpectedEof { pos }
            | Self::MismatchedTag { pos, .. }
            | Self::UnknownEntity { pos, .. }
            | Self::InvalidSyntax { pos, .. }
            | Self::LexerError { pos } => *pos,
        }
    }

    /// Render a human-readable report pointing into `source`.
    #[cfg(feature = "pretty-errors")]
    pub fn report(&self, source: &str) -> String {
        use ariadne::{Config, Label, Report, ReportKind, Source};

        let start = self.pos().min(source.len());
        let end = (start + 1).min(source.len()).max(start);

        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, (), start)
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(Label::new(start..end).with_message("here"))
            .finish()
            .write(Source::from(source), &mut out);

        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Tree state that cannot be written as markup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializeError {
    #[error("Invalid element or attribute name: {0:?}")]
    InvalidName(String),

    #[error("Character U+{0:04X} is not allowed in markup")]
    InvalidChar(u32),
}
