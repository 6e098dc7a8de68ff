use crate::error::{ParseError, ParseResult};
use crate::escape::{check_chars, unescape};
use crate::tokenizer::{tokenize, Spanned, Token};
use crate::tree::{Attribute, Document, Element, Node};
use std::ops::Range;

/// Parser for markup part content
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Spanned<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// Parse a complete document: prolog, one root element, trailing misc.
    pub fn parse_document(&mut self) -> ParseResult<Document> {
        let mut declaration = None;
        let mut seen_markup = false;

        let root = loop {
            match self.peek() {
                Some((Token::ProcessingInstruction(pi), _)) => {
                    if !seen_markup && declaration.is_none() && is_declaration(pi) {
                        declaration = Some(pi.to_string());
                    }
                    seen_markup = true;
                    self.advance();
                }
                Some((Token::Comment(_), _)) => {
                    seen_markup = true;
                    self.advance();
                }
                Some((Token::Text(text), span)) => {
                    if !text.trim().is_empty() {
                        return Err(ParseError::invalid_syntax(
                            span.start,
                            "text outside of the root element",
                        ));
                    }
                    self.advance();
                }
                Some((Token::TagOpen(_), _)) => break self.parse_element()?,
                Some((token, span)) => {
                    return Err(ParseError::unexpected_token(span.start, "root element", token.to_string()));
                }
                None => return Err(ParseError::unexpected_eof(self.source.len())),
            }
        };

        while let Some((token, span)) = self.advance() {
            match token {
                Token::Comment(_) | Token::ProcessingInstruction(_) => {}
                Token::Text(text) if text.trim().is_empty() => {}
                other => {
                    return Err(ParseError::invalid_syntax(
                        span.start,
                        format!("{} after the root element", other),
                    ));
                }
            }
        }

        Ok(Document { declaration, root })
    }

    /// Parse one element starting at its `<name` token
    fn parse_element(&mut self) -> ParseResult<Element> {
        let name = match self.advance() {
            Some((Token::TagOpen(name), _)) => name,
            Some((token, span)) => {
                return Err(ParseError::unexpected_token(span.start, "start tag", token.to_string()));
            }
            None => return Err(ParseError::unexpected_eof(self.source.len())),
        };
        let mut element = Element::new(name);

        loop {
            match self.advance() {
                Some((Token::AttrName(attr), span)) => {
                    self.expect_equals()?;
                    let (raw, value_span) = self.expect_value()?;
                    if element.attribute(attr).is_some() {
                        return Err(ParseError::invalid_syntax(
                            span.start,
                            format!("duplicate attribute '{}'", attr),
                        ));
                    }
                    let value = unescape(raw, value_span.start + 1)?;
                    element.attributes.push(Attribute::new(attr, value));
                }
                Some((Token::TagClose, _)) => break,
                Some((Token::EmptyTagClose, _)) => return Ok(element),
                Some((token, span)) => {
                    return Err(ParseError::unexpected_token(span.start, "attribute or '>'", token.to_string()));
                }
                None => return Err(ParseError::unexpected_eof(self.source.len())),
            }
        }

        loop {
            match self.peek() {
                Some((Token::TagOpen(_), _)) => {
                    let child = self.parse_element()?;
                    element.children.push(Node::Element(child));
                }
                Some((Token::Text(raw), span)) => {
                    element.add_text(unescape(raw, span.start)?);
                    self.advance();
                }
                Some((Token::CData(text), span)) => {
                    check_chars(text, span.start + "<![CDATA[".len())?;
                    element.add_text(text);
                    self.advance();
                }
                Some((Token::Comment(_), _)) | Some((Token::ProcessingInstruction(_), _)) => {
                    self.advance();
                }
                Some((Token::EndTag(end), span)) => {
                    if end != element.name {
                        return Err(ParseError::MismatchedTag {
                            pos: span.start,
                            expected: element.name,
                            found: end.to_string(),
                        });
                    }
                    self.advance();
                    break;
                }
                Some((token, span)) => {
                    return Err(ParseError::unexpected_token(span.start, "content", token.to_string()));
                }
                None => return Err(ParseError::unexpected_eof(self.source.len())),
            }
        }

        drop_formatting_whitespace(&mut element);
        Ok(element)
    }

    fn expect_equals(&mut self) -> ParseResult<()> {
        match self.advance() {
            Some((Token::Equals, _)) => Ok(()),
            Some((token, span)) => Err(ParseError::unexpected_token(span.start, "'='", token.to_string())),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn expect_value(&mut self) -> ParseResult<(&'src str, Range<usize>)> {
        match self.advance() {
            Some((Token::AttrValue(value), span)) => Ok((value, span)),
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                "quoted attribute value",
                token.to_string(),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn peek(&self) -> Option<Spanned<'src>> {
        self.tokens.get(self.pos).cloned()
    }

    fn advance(&mut self) -> Option<Spanned<'src>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }
}

/// Parse part content from bytes
pub fn parse(bytes: &[u8]) -> ParseResult<Document> {
    let source = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidEncoding {
        pos: e.valid_up_to(),
    })?;
    parse_str(source)
}

/// Parse part content from text
pub fn parse_str(source: &str) -> ParseResult<Document> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    Parser::new(source)?.parse_document()
}

fn is_declaration(pi: &str) -> bool {
    pi.strip_prefix("<?xml")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_whitespace() || c == '?')
}

/// Whitespace-only text beside element children is layout, not content.
fn drop_formatting_whitespace(element: &mut Element) {
    if element.has_elements() {
        element
            .children
            .retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declaration_and_root() {
        let doc = parse_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<w:document><w:body/></w:document>").unwrap();
        assert_eq!(
            doc.declaration.as_deref(),
            Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
        );
        assert_eq!(doc.root.name, "w:document");
        assert!(doc.root.element("w:body").is_some());
    }

    #[test]
    fn test_layout_whitespace_is_dropped() {
        let doc = parse_str("<a>\n  <b/>\n  <c/>\n</a>").unwrap();
        assert_eq!(doc.root.children.len(), 2);
    }

    #[test]
    fn test_text_only_whitespace_is_kept() {
        let doc = parse_str("<w:t> </w:t>").unwrap();
        assert_eq!(doc.root.value(), " ");
    }

    #[test]
    fn test_entities_and_cdata_merge_into_text() {
        let doc = parse_str("<t>a &amp; b<![CDATA[ <c> ]]></t>").unwrap();
        assert_eq!(doc.root.children, vec![Node::Text("a & b <c> ".to_string())]);
    }

    #[test]
    fn test_attribute_entities_are_resolved() {
        let doc = parse_str(r#"<a title="x &lt; y"/>"#).unwrap();
        assert_eq!(doc.root.attribute("title"), Some("x < y"));
    }

    #[test]
    fn test_control_chars_are_rejected_everywhere() {
        assert!(matches!(parse_str("<a>bell\u{7}</a>"), Err(ParseError::InvalidSyntax { pos: 7, .. })));
        assert!(parse_str("<a k=\"\u{1}\"/>").is_err());
        assert!(matches!(
            parse_str("<a><![CDATA[x\u{1b}]]></a>"),
            Err(ParseError::InvalidSyntax { pos: 13, .. })
        ));
    }

    #[test]
    fn test_mismatched_tag() {
        let err = parse_str("<a><b></a></b>").unwrap_err();
        assert!(matches!(err, ParseError::MismatchedTag { pos: 6, .. }));
    }

    #[test]
    fn test_duplicate_attribute() {
        assert!(parse_str(r#"<a x="1" x="2"/>"#).is_err());
    }

    #[test]
    fn test_missing_root_is_eof() {
        assert!(matches!(parse_str("  ").unwrap_err(), ParseError::UnexpectedEof { .. }));
        assert!(matches!(parse(b"").unwrap_err(), ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_second_root_is_rejected() {
        assert!(parse_str("<a/><b/>").is_err());
        assert!(parse_str("<a/>text").is_err());
    }

    #[test]
    fn test_invalid_utf8() {
        let err = parse(&[b'<', b'a', 0xFF, b'/', b'>']).unwrap_err();
        assert_eq!(err, ParseError::InvalidEncoding { pos: 2 });
    }

    #[test]
    fn test_comments_are_skipped() {
        let doc = parse_str("<!-- head --><a><!-- inner -->x</a><!-- tail -->").unwrap();
        assert_eq!(doc.declaration, None);
        assert_eq!(doc.root.value(), "x");
    }
}
