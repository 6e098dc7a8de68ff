use crate::error::{SerializeError, SerializeResult};
use crate::escape::{escape_attribute, escape_text, is_markup_char, is_valid_name};
use crate::tree::{Document, Element, Node};

/// Serializer converts a tree back to markup text
///
/// Compact output is stable: serializing, parsing and serializing again
/// yields identical text. Indented output only re-flows elements whose
/// children are all elements, so it parses back to an equal tree.
pub struct Serializer {
    indent_string: Option<String>,
}

impl Serializer {
    pub fn new() -> Self {
        Self { indent_string: None }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_string: Some(indent.to_string()),
        }
    }

    /// Serialize a Document to markup text
    pub fn serialize(&self, doc: &Document) -> SerializeResult<String> {
        let mut output = String::new();

        if let Some(declaration) = &doc.declaration {
            output.push_str(declaration);
            if self.indent_string.is_some() {
                output.push('\n');
            }
        }

        self.serialize_element(&doc.root, 0, &mut output)?;

        if self.indent_string.is_some() {
            output.push('\n');
        }
        Ok(output)
    }

    fn serialize_element(&self, element: &Element, depth: usize, output: &mut String) -> SerializeResult<()> {
        check_name(&element.name)?;

        output.push('<');
        output.push_str(&element.name);
        for attr in &element.attributes {
            check_name(&attr.name)?;
            check_text(&attr.value)?;
            output.push(' ');
            output.push_str(&attr.name);
            output.push_str("=\"");
            output.push_str(&escape_attribute(&attr.value));
            output.push('"');
        }

        if element.children.is_empty() {
            output.push_str("/>");
            return Ok(());
        }
        output.push('>');

        let has_text = element.children.iter().any(|node| matches!(node, Node::Text(_)));
        match &self.indent_string {
            Some(indent) if !has_text => {
                for child in &element.children {
                    output.push('\n');
                    push_indent(output, indent, depth + 1);
                    self.serialize_node(child, depth + 1, output)?;
                }
                output.push('\n');
                push_indent(output, indent, depth);
            }
            _ => {
                // Mixed content is written inline, whatever the indent setting.
                let inline = Serializer::new();
                for child in &element.children {
                    inline.serialize_node(child, 0, output)?;
                }
            }
        }

        output.push_str("</");
        output.push_str(&element.name);
        output.push('>');
        Ok(())
    }

    fn serialize_node(&self, node: &Node, depth: usize, output: &mut String) -> SerializeResult<()> {
        match node {
            Node::Element(element) => self.serialize_element(element, depth, output),
            Node::Text(text) => {
                check_text(text)?;
                output.push_str(&escape_text(text));
                Ok(())
            }
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a Document to compact markup text
pub fn serialize(doc: &Document) -> SerializeResult<String> {
    Serializer::new().serialize(doc)
}

/// Serialize a Document to compact UTF-8 bytes
pub fn to_bytes(doc: &Document) -> SerializeResult<Vec<u8>> {
    serialize(doc).map(String::into_bytes)
}

fn push_indent(output: &mut String, indent: &str, depth: usize) {
    for _ in 0..depth {
        output.push_str(indent);
    }
}

fn check_name(name: &str) -> SerializeResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(SerializeError::InvalidName(name.to_string()))
    }
}

fn check_text(text: &str) -> SerializeResult<()> {
    match text.chars().find(|c| !is_markup_char(*c)) {
        Some(c) => Err(SerializeError::InvalidChar(c as u32)),
        None => Ok(()),
    }
}
