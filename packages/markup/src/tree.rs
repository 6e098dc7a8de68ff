use serde::{Deserialize, Serialize};

/// Root of a parsed part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Leading `<?xml ...?>` declaration, verbatim
    pub declaration: Option<String>,
    pub root: Element,
}

/// Name/value pair on an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Child of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Labelled element node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Qualified label, e.g. `w:p`
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            declaration: None,
            root,
        }
    }

    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    /// All elements named `name` in document order, the root included.
    pub fn descendants<'a>(&'a self, name: &'a str) -> Descendants<'a> {
        Descendants {
            stack: vec![&self.root],
            name: Some(name),
        }
    }

    /// First element named `name` in document order, the root included.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        if self.root.name == name {
            return Some(&mut self.root);
        }
        self.root.find_mut(name)
    }
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.add_text(text);
        self
    }

    /// Label without its prefix (`p` for `w:p`)
    pub fn local_name(&self) -> &str {
        self.name.split_once(':').map_or(&self.name, |(_, local)| local)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|attr| attr.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// Append a child element and return it for further edits.
    pub fn add_child(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        match self.children.last_mut() {
            Some(Node::Element(element)) => element,
            _ => unreachable!("just pushed an element"),
        }
    }

    /// Append text, merging with a trailing text node.
    pub fn add_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(&text);
        } else {
            self.children.push(Node::Text(text));
        }
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Direct child elements named `name`
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    /// First direct child element named `name`
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    pub fn has_elements(&self) -> bool {
        self.children.iter().any(|node| matches!(node, Node::Element(_)))
    }

    /// Descendant elements named `name` in document order, self excluded.
    pub fn descendants<'a>(&'a self, name: &'a str) -> Descendants<'a> {
        Descendants {
            stack: self.elements().collect::<Vec<_>>().into_iter().rev().collect(),
            name: Some(name),
        }
    }

    /// Every descendant element in document order, self excluded.
    pub fn all_descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.elements().collect::<Vec<_>>().into_iter().rev().collect(),
            name: None,
        }
    }

    /// First descendant named `name`, depth first.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for node in &mut self.children {
            if let Node::Element(element) = node {
                if element.name == name {
                    return Some(element);
                }
                if let Some(found) = element.find_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Concatenated text of all descendants
    pub fn value(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

/// Pre-order iterator over elements
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
    name: Option<&'a str>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(element) = self.stack.pop() {
            let children: Vec<&Element> = element.elements().collect();
            self.stack.extend(children.into_iter().rev());

            if self.name.map_or(true, |name| element.name == name) {
                return Some(element);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(
            Element::new("w:document").with_child(
                Element::new("w:body")
                    .with_child(
                        Element::new("w:p")
                            .with_child(Element::new("w:r").with_child(Element::new("w:t").with_text("One"))),
                    )
                    .with_child(
                        Element::new("w:p")
                            .with_child(Element::new("w:r").with_child(Element::new("w:t").with_text("Two"))),
                    ),
            ),
        )
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = sample();
        let values: Vec<String> = doc.descendants("w:p").map(Element::value).collect();
        assert_eq!(values, vec!["One", "Two"]);
    }

    #[test]
    fn test_document_descendants_include_root() {
        let doc = sample();
        assert_eq!(doc.descendants("w:document").count(), 1);
        assert_eq!(doc.root.descendants("w:document").count(), 0);
        assert_eq!(doc.root.all_descendants().count(), 7);
    }

    #[test]
    fn test_find_mut_and_add_child() {
        let mut doc = sample();
        let body = doc.find_mut("w:body").unwrap();
        body.add_child(Element::new("w:p")).add_child(Element::new("w:r")).add_text("Three");

        let values: Vec<String> = doc.descendants("w:p").map(Element::value).collect();
        assert_eq!(values, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_attributes_replace_in_place() {
        let mut element = Element::new("w:p").with_attribute("a", "1").with_attribute("b", "2");
        element.set_attribute("a", "3");

        assert_eq!(element.attribute("a"), Some("3"));
        assert_eq!(element.attributes[0].name, "a");
        assert_eq!(element.remove_attribute("b"), Some("2".to_string()));
        assert_eq!(element.attribute("b"), None);
    }

    #[test]
    fn test_add_text_merges() {
        let mut element = Element::new("w:t");
        element.add_text("Hello, ");
        element.add_text("world");
        assert_eq!(element.children, vec![Node::Text("Hello, world".to_string())]);
    }

    #[test]
    fn test_names() {
        let element = Element::new("w:p");
        assert_eq!(element.local_name(), "p");
        assert_eq!(element.prefix(), Some("w"));
        assert_eq!(Element::new("body").prefix(), None);
    }
}
