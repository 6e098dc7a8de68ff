//! # Docpack Markup
//!
//! Generic, label-addressed tree representation of part content.
//!
//! ```text
//! bytes ──parse──▶ Document { root: Element { name, attributes, children } }
//!   ▲                                  │
//!   └────────────serialize─────────────┘
//! ```
//!
//! Parsing normalizes layout whitespace (whitespace-only text beside element
//! siblings is dropped), so `serialize(parse(c))` parses to a tree equal to
//! `parse(c)` and compact serialization is stable.

pub mod error;
pub mod escape;
pub mod parser;
pub mod serializer;
pub mod tokenizer;
pub mod tree;

pub use error::{ParseError, ParseResult, SerializeError, SerializeResult};
pub use parser::{parse, parse_str, Parser};
pub use serializer::{serialize, to_bytes, Serializer};
pub use tokenizer::{tokenize, Token};
pub use tree::{Attribute, Descendants, Document, Element, Node};
