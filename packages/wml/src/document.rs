use crate::error::WmlError;
use crate::names::{self, BODY, DOCUMENT, P, P_PR, R, R_PR, T};
use docpack::{ModelError, TypedModel};
use docpack_markup::{parse, to_bytes, Attribute, Document, Element};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Typed view of a main document part
#[derive(Debug, Clone, PartialEq)]
pub struct WordDocument {
    /// Attributes of `w:document`, namespace declarations included
    pub attributes: Vec<Attribute>,
    pub body: Body,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub paragraphs: Vec<Paragraph>,
    /// Body children other than paragraphs (`w:tbl`, `w:sectPr`, ...),
    /// written after the paragraphs
    pub trailing: Vec<Element>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// `w:pPr`, kept as read
    pub properties: Option<Element>,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    /// `w:rPr`, kept as read
    pub properties: Option<Element>,
    pub text: String,
}

impl Default for WordDocument {
    fn default() -> Self {
        let (xmlns, uri) = names::XMLNS_W;
        Self {
            attributes: vec![Attribute::new(xmlns, uri)],
            body: Body::default(),
        }
    }
}

impl Body {
    /// Append a paragraph holding a single run of `text`.
    pub fn push_paragraph(&mut self, text: impl Into<String>) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::with_text(text));
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    pub fn texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(Paragraph::inner_text).collect()
    }
}

impl Paragraph {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            properties: None,
            runs: vec![Run::new(text)],
        }
    }

    /// Text of all runs, concatenated
    pub fn inner_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    fn from_element(element: &Element) -> Self {
        Self {
            properties: element.element(P_PR).cloned(),
            runs: element.elements_named(R).map(Run::from_element).collect(),
        }
    }

    fn to_element(&self) -> Element {
        let mut p = Element::new(P);
        if let Some(properties) = &self.properties {
            p.add_child(properties.clone());
        }
        for run in &self.runs {
            p.add_child(run.to_element());
        }
        p
    }

    /// Tree form of a paragraph with one run of `text`
    pub fn element(text: impl Into<String>) -> Element {
        Paragraph::with_text(text).to_element()
    }
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            properties: None,
            text: text.into(),
        }
    }

    fn from_element(element: &Element) -> Self {
        Self {
            properties: element.element(R_PR).cloned(),
            text: element.elements_named(T).map(Element::value).collect(),
        }
    }

    fn to_element(&self) -> Element {
        let mut r = Element::new(R);
        if let Some(properties) = &self.properties {
            r.add_child(properties.clone());
        }

        let mut t = Element::new(T);
        if self.text.starts_with(char::is_whitespace) || self.text.ends_with(char::is_whitespace) {
            t.set_attribute("xml:space", "preserve");
        }
        if !self.text.is_empty() {
            t.add_text(self.text.clone());
        }
        r.add_child(t);
        r
    }
}

impl WordDocument {
    pub fn from_tree(doc: &Document) -> Result<Self, WmlError> {
        if doc.root.name != DOCUMENT {
            return Err(WmlError::UnexpectedRoot {
                expected: DOCUMENT,
                found: doc.root.name.clone(),
            });
        }
        let body = doc.root.element(BODY).ok_or(WmlError::MissingBody(BODY))?;

        let mut paragraphs = Vec::new();
        let mut trailing = Vec::new();
        for child in body.elements() {
            if child.name == P {
                paragraphs.push(Paragraph::from_element(child));
            } else {
                trailing.push(child.clone());
            }
        }

        Ok(Self {
            attributes: doc.root.attributes.clone(),
            body: Body { paragraphs, trailing },
        })
    }

    pub fn to_tree(&self) -> Document {
        let mut body = Element::new(BODY);
        for paragraph in &self.body.paragraphs {
            body.add_child(paragraph.to_element());
        }
        for element in &self.body.trailing {
            body.add_child(element.clone());
        }

        let mut root = Element::new(DOCUMENT);
        root.attributes = self.attributes.clone();
        let (xmlns, uri) = names::XMLNS_W;
        if root.attribute(xmlns).is_none() {
            root.set_attribute(xmlns, uri);
        }
        root.add_child(body);
        Document::new(root).with_declaration(DECLARATION)
    }
}

impl TypedModel for WordDocument {
    fn deserialize_from(bytes: &[u8]) -> Result<Self, ModelError> {
        let doc = parse(bytes)?;
        Ok(Self::from_tree(&doc)?)
    }

    fn serialize_to(&self, sink: &mut Vec<u8>) -> Result<(), ModelError> {
        sink.extend(to_bytes(&self.to_tree())?);
        Ok(())
    }
}
