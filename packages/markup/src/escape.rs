use crate::error::{ParseError, ParseResult};
use std::borrow::Cow;

/// Characters allowed in markup content
pub fn is_markup_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Labels accepted by the tokenizer: `[A-Za-z_][A-Za-z0-9_:.-]*`
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'))
}

/// Reject characters the serializer cannot write back.
///
/// `pos` is the byte offset of `raw` in the source.
pub fn check_chars(raw: &str, pos: usize) -> ParseResult<()> {
    match raw.char_indices().find(|(_, c)| !is_markup_char(*c)) {
        Some((offset, c)) => Err(ParseError::invalid_syntax(
            pos + offset,
            format!("illegal character U+{:04X}", c as u32),
        )),
        None => Ok(()),
    }
}

/// Resolve character and predefined entity references in `raw`.
///
/// `pos` is the byte offset of `raw` in the source and is only used for
/// error positions.
pub fn unescape(raw: &str, pos: usize) -> ParseResult<Cow<'_, str>> {
    check_chars(raw, pos)?;
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        let at = pos + (raw.len() - rest.len()) + amp;
        out.push_str(&rest[..amp]);

        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| ParseError::invalid_syntax(at, "unterminated entity reference"))?;
        let entity = &after[..semi];

        let resolved = resolve_entity(entity).ok_or_else(|| ParseError::UnknownEntity {
            pos: at,
            entity: entity.to_string(),
        })?;
        out.push(resolved);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);

    Ok(Cow::Owned(out))
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code).filter(|c| is_markup_char(*c))
        }
    }
}

pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

fn escape(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>') || (quotes && c == '"');
    if !text.chars().any(needs) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_predefined_and_numeric() {
        let text = unescape("a &lt;b&gt; &amp; &#65;&#x42;", 0).unwrap();
        assert_eq!(text, "a <b> & AB");
    }

    #[test]
    fn test_unescape_borrows_when_plain() {
        assert!(matches!(unescape("plain", 0).unwrap(), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_unknown_entity_reports_position() {
        let err = unescape("ab&nbsp;", 10).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownEntity {
                pos: 12,
                entity: "nbsp".to_string()
            }
        );
    }

    #[test]
    fn test_illegal_char_reference_is_rejected() {
        assert!(unescape("&#0;", 0).is_err());
    }

    #[test]
    fn test_raw_control_char_is_rejected() {
        let err = unescape("bell\u{7}", 20).unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { pos: 24, .. }));
        assert!(unescape("tab\tand\nnewline", 0).is_ok());
        assert!(check_chars("\u{FFFE}", 0).is_err());
    }

    #[test]
    fn test_escape_attribute_quotes() {
        assert_eq!(escape_attribute(r#"say "hi" & <go>"#), "say &quot;hi&quot; &amp; &lt;go&gt;");
        assert_eq!(escape_text(r#""quoted""#), r#""quoted""#);
    }

    #[test]
    fn test_names() {
        assert!(is_valid_name("w:p"));
        assert!(is_valid_name("_x-1.y"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1p"));
        assert!(!is_valid_name("bad name"));
    }
}
