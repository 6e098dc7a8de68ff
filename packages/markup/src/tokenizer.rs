use crate::error::{ParseError, ParseResult};
use logos::{Lexer, Logos};
use std::fmt;
use std::ops::Range;

/// Token with its byte range in the source
pub type Spanned<'src> = (Token<'src>, Range<usize>);

/// Tokens produced between tags
#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentToken<'src> {
    #[regex(r"<[A-Za-z_][A-Za-z0-9_:.\-]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    #[regex(r"</[A-Za-z_][A-Za-z0-9_:.\-]*[ \t\r\n]*>", |lex| end_tag_name(lex.slice()))]
    EndTag(&'src str),

    #[token("<?", processing_instruction)]
    ProcessingInstruction(&'src str),

    #[token("<!--", comment)]
    Comment(&'src str),

    #[token("<![CDATA[", cdata)]
    CData(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokens produced inside a start tag, up to and including `>` or `/>`
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum TagToken<'src> {
    #[regex(r"[A-Za-z_][A-Za-z0-9_:.\-]*", |lex| lex.slice())]
    Name(&'src str),

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'[^']*'", |lex| unquote(lex.slice()))]
    Value(&'src str),

    #[token(">")]
    Close,

    #[token("/>")]
    SelfClose,
}

/// Markup token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// `<name`
    TagOpen(&'src str),
    /// Attribute name inside a start tag
    AttrName(&'src str),
    Equals,
    /// Attribute value without quotes, entities still escaped
    AttrValue(&'src str),
    /// `>` ending a start tag
    TagClose,
    /// `/>` ending an empty element
    EmptyTagClose,
    /// `</name>`
    EndTag(&'src str),
    /// Character data, entities still escaped
    Text(&'src str),
    /// Contents of a CDATA section
    CData(&'src str),
    /// Full `<?...?>` text
    ProcessingInstruction(&'src str),
    Comment(&'src str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::TagOpen(name) => write!(f, "'<{}'", name),
            Token::AttrName(name) => write!(f, "attribute '{}'", name),
            Token::Equals => write!(f, "'='"),
            Token::AttrValue(value) => write!(f, "value \"{}\"", value),
            Token::TagClose => write!(f, "'>'"),
            Token::EmptyTagClose => write!(f, "'/>'"),
            Token::EndTag(name) => write!(f, "'</{}>'", name),
            Token::Text(_) => write!(f, "text"),
            Token::CData(_) => write!(f, "CDATA section"),
            Token::ProcessingInstruction(_) => write!(f, "processing instruction"),
            Token::Comment(_) => write!(f, "comment"),
        }
    }
}

impl<'src> From<ContentToken<'src>> for Token<'src> {
    fn from(token: ContentToken<'src>) -> Self {
        match token {
            ContentToken::TagOpen(name) => Token::TagOpen(name),
            ContentToken::EndTag(name) => Token::EndTag(name),
            ContentToken::ProcessingInstruction(text) => Token::ProcessingInstruction(text),
            ContentToken::Comment(text) => Token::Comment(text),
            ContentToken::CData(text) => Token::CData(text),
            ContentToken::Text(text) => Token::Text(text),
        }
    }
}

impl<'src> From<TagToken<'src>> for Token<'src> {
    fn from(token: TagToken<'src>) -> Self {
        match token {
            TagToken::Name(name) => Token::AttrName(name),
            TagToken::Equals => Token::Equals,
            TagToken::Value(value) => Token::AttrValue(value),
            TagToken::Close => Token::TagClose,
            TagToken::SelfClose => Token::EmptyTagClose,
        }
    }
}

/// Tokenize markup source.
///
/// The lexer switches into tag mode after `<name` and back to content mode
/// after the closing `>` or `/>`.
pub fn tokenize(source: &str) -> ParseResult<Vec<Spanned<'_>>> {
    let mut tokens = Vec::new();
    let mut content = ContentToken::lexer(source);

    while let Some(next) = content.next() {
        let span = content.span();
        match next {
            Ok(ContentToken::TagOpen(name)) => {
                tokens.push((Token::TagOpen(name), span));

                let mut tag = content.morph::<TagToken<'_>>();
                loop {
                    match tag.next() {
                        Some(Ok(token)) => {
                            let done = matches!(token, TagToken::Close | TagToken::SelfClose);
                            tokens.push((token.into(), tag.span()));
                            if done {
                                break;
                            }
                        }
                        Some(Err(())) => return Err(ParseError::lexer_error(tag.span().start)),
                        None => return Err(ParseError::unexpected_eof(source.len())),
                    }
                }
                content = tag.morph();
            }
            Ok(token) => tokens.push((token.into(), span)),
            Err(()) => return Err(ParseError::lexer_error(span.start)),
        }
    }

    Ok(tokens)
}

fn end_tag_name(slice: &str) -> &str {
    slice[2..slice.len() - 1].trim_end()
}

fn unquote(slice: &str) -> &str {
    &slice[1..slice.len() - 1]
}

fn processing_instruction<'src>(lex: &mut Lexer<'src, ContentToken<'src>>) -> Option<&'src str> {
    let start = lex.span().start;
    let end = lex.remainder().find("?>")?;
    lex.bump(end + 2);
    Some(&lex.source()[start..lex.span().end])
}

fn comment<'src>(lex: &mut Lexer<'src, ContentToken<'src>>) -> Option<&'src str> {
    let rest = lex.remainder();
    let end = rest.find("-->")?;
    lex.bump(end + 3);
    Some(&rest[..end])
}

fn cdata<'src>(lex: &mut Lexer<'src, ContentToken<'src>>) -> Option<&'src str> {
    let rest = lex.remainder();
    let end = rest.find("]]>")?;
    lex.bump(end + 3);
    Some(&rest[..end])
}
