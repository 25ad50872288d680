//! Lexer for console markup using logos
//!
//! Markup needs two token sets: outside a tag everything up to `<` or `&` is
//! literal text, while inside a tag whitespace separates names, `=` and
//! quoted values. [`lex`] runs a [`ContentToken`] lexer and morphs into a
//! [`TagToken`] lexer at every `<name`, morphing back at `>` or `/>`.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Tokens seen by the grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Literal text, a decoded reference, or CDATA content
    Text(String),
    /// `<name`, opening a tag
    TagStart(String),
    /// `</name>`
    EndTag(String),
    /// Attribute name inside a tag
    Name(String),
    Equals,
    /// Raw attribute value, quotes stripped but references not yet decoded
    Value(String),
    /// `>`
    TagEnd,
    /// `/>`
    EmptyTagEnd,
    /// Input neither lexer accepts
    Invalid(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"<!--([^-]|-[^-])*-->")]
#[logos(skip r"<\?([^?]|\?[^>])*\?>")]
enum ContentToken {
    #[regex(r"[^<&]+", |lex| lex.slice().to_string())]
    Text(String),

    #[regex(r"&(#[0-9]+|#x[0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);", reference)]
    Reference(String),

    #[token("<![CDATA[", cdata)]
    CData(String),

    #[regex(r"<[A-Za-z_][A-Za-z0-9_.:\-]*", |lex| lex.slice()[1..].to_string())]
    TagStart(String),

    #[regex(r"</[A-Za-z_][A-Za-z0-9_.:\-]*[ \t\r\n]*>", |lex| {
        lex.slice()[2..]
            .trim_end_matches('>')
            .trim_end()
            .to_string()
    })]
    EndTag(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum TagToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_.:\-]*", |lex| lex.slice().to_string())]
    Name(String),

    #[token("=")]
    Equals,

    #[regex(r#""[^"<]*""#, quoted)]
    #[regex(r"'[^'<]*'", quoted)]
    Value(String),

    #[token(">")]
    TagEnd,

    #[token("/>")]
    EmptyTagEnd,
}

fn reference(lex: &mut logos::Lexer<ContentToken>) -> Option<String> {
    let slice = lex.slice();
    decode_reference(&slice[1..slice.len() - 1]).map(String::from)
}

/// CDATA runs to the first `]]>`; any other `]` is content
fn cdata(lex: &mut logos::Lexer<ContentToken>) -> Option<String> {
    let end = lex.remainder().find("]]>")?;
    let content = lex.remainder()[..end].to_string();
    lex.bump(end + 3);
    Some(content)
}

fn quoted(lex: &mut logos::Lexer<TagToken>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].to_string()
}

/// Decode the body of `&...;` (without `&` and `;`)
pub fn decode_reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code).filter(|c| *c != '\0')
        }
    }
}

/// Decode references in a raw attribute value
///
/// Literal tabs and line breaks become spaces, as in XML attribute value
/// normalization.
pub fn unescape_attribute(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find(['&', '\t', '\n', '\r']) {
        out.push_str(&rest[..pos]);
        if rest[pos..].starts_with('&') {
            let end = rest[pos..]
                .find(';')
                .ok_or_else(|| "unterminated reference in attribute value".to_string())?;
            let name = &rest[pos + 1..pos + end];
            let ch = decode_reference(name)
                .ok_or_else(|| format!("unknown reference '&{};' in attribute value", name))?;
            out.push(ch);
            rest = &rest[pos + end + 1..];
        } else {
            out.push(' ');
            rest = &rest[pos + 1..];
        }
    }
    out.push_str(rest);
    Ok(out)
}

enum Mode<'a> {
    Content(logos::Lexer<'a, ContentToken>),
    Tag(logos::Lexer<'a, TagToken>),
    Done,
}

/// Iterator over markup tokens, switching lexers at tag boundaries
pub struct MarkupLexer<'a> {
    mode: Mode<'a>,
}

/// Tokenize markup source
pub fn lex(input: &str) -> MarkupLexer<'_> {
    MarkupLexer {
        mode: Mode::Content(ContentToken::lexer(input)),
    }
}

impl<'a> Iterator for MarkupLexer<'a> {
    type Item = (Token, Span);

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.mode, Mode::Done) {
            Mode::Content(mut lexer) => {
                let result = lexer.next()?;
                let span = lexer.span();
                let token = match result {
                    Ok(ContentToken::TagStart(name)) => {
                        self.mode = Mode::Tag(lexer.morph());
                        return Some((Token::TagStart(name), span));
                    }
                    Ok(ContentToken::Text(s))
                    | Ok(ContentToken::Reference(s))
                    | Ok(ContentToken::CData(s)) => Token::Text(s),
                    Ok(ContentToken::EndTag(name)) => Token::EndTag(name),
                    Err(()) => Token::Invalid(lexer.slice().to_string()),
                };
                self.mode = Mode::Content(lexer);
                Some((token, span))
            }
            Mode::Tag(mut lexer) => {
                let result = lexer.next()?;
                let span = lexer.span();
                let token = match result {
                    Ok(TagToken::TagEnd) => {
                        self.mode = Mode::Content(lexer.morph());
                        return Some((Token::TagEnd, span));
                    }
                    Ok(TagToken::EmptyTagEnd) => {
                        self.mode = Mode::Content(lexer.morph());
                        return Some((Token::EmptyTagEnd, span));
                    }
                    Ok(TagToken::Name(name)) => Token::Name(name),
                    Ok(TagToken::Equals) => Token::Equals,
                    Ok(TagToken::Value(v)) => Token::Value(v),
                    Err(()) => Token::Invalid(lexer.slice().to_string()),
                };
                self.mode = Mode::Tag(lexer);
                Some((token, span))
            }
            Mode::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(tokens("hello world"), vec![Token::Text("hello world".into())]);
    }

    #[test]
    fn test_element_with_attributes() {
        assert_eq!(
            tokens(r#"<color fg="red" bg='blue'>x</color>"#),
            vec![
                Token::TagStart("color".into()),
                Token::Name("fg".into()),
                Token::Equals,
                Token::Value("red".into()),
                Token::Name("bg".into()),
                Token::Equals,
                Token::Value("blue".into()),
                Token::TagEnd,
                Token::Text("x".into()),
                Token::EndTag("color".into()),
            ]
        );
    }

    #[test]
    fn test_empty_element() {
        assert_eq!(
            tokens(r#"<cursor x="5"/>"#),
            vec![
                Token::TagStart("cursor".into()),
                Token::Name("x".into()),
                Token::Equals,
                Token::Value("5".into()),
                Token::EmptyTagEnd,
            ]
        );
    }

    #[test]
    fn test_text_containing_tag_syntax_outside_tags() {
        assert_eq!(
            tokens(r#"a="1" > b"#),
            vec![Token::Text(r#"a="1" > b"#.into())]
        );
    }

    #[test]
    fn test_references_are_decoded() {
        assert_eq!(
            tokens("&lt;&#65;&#x42;&amp;"),
            vec![
                Token::Text("<".into()),
                Token::Text("A".into()),
                Token::Text("B".into()),
                Token::Text("&".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_entity_is_invalid() {
        let toks = tokens("&nbsp;");
        assert!(matches!(toks[0], Token::Invalid(_)));
    }

    #[test]
    fn test_bare_ampersand_is_invalid() {
        let toks = tokens("a & b");
        assert_eq!(toks[0], Token::Text("a ".into()));
        assert!(matches!(toks[1], Token::Invalid(_)));
    }

    #[test]
    fn test_comments_and_processing_instructions_skipped() {
        assert_eq!(
            tokens("a<!-- note -->b<?pi data?>c"),
            vec![
                Token::Text("a".into()),
                Token::Text("b".into()),
                Token::Text("c".into()),
            ]
        );
    }

    #[test]
    fn test_cdata_is_verbatim() {
        assert_eq!(
            tokens("<![CDATA[<color>&]]>"),
            vec![Token::Text("<color>&".into())]
        );
    }

    #[test]
    fn test_cdata_with_brackets_inside() {
        assert_eq!(tokens("<![CDATA[x]]y]]>"), vec![Token::Text("x]]y".into())]);
        assert_eq!(tokens("<![CDATA[a]]]>"), vec![Token::Text("a]".into())]);
        assert_eq!(tokens("<![CDATA[]]>"), vec![Token::Text("".into())]);
    }

    #[test]
    fn test_unterminated_cdata_is_invalid() {
        let toks = tokens("<![CDATA[open");
        assert!(matches!(toks[0], Token::Invalid(_)));
    }

    #[test]
    fn test_end_tag_allows_trailing_whitespace() {
        assert_eq!(tokens("</color  >"), vec![Token::EndTag("color".into())]);
    }

    #[test]
    fn test_spans_index_source() {
        let spans: Vec<_> = lex("ab<x/>").map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..2, 2..4, 4..6]);
    }

    #[test]
    fn test_unescape_attribute() {
        assert_eq!(unescape_attribute("a&amp;b").unwrap(), "a&b");
        assert_eq!(unescape_attribute("line\nbreak\ttab").unwrap(), "line break tab");
        assert!(unescape_attribute("a&b").is_err());
        assert!(unescape_attribute("&bogus;").is_err());
    }
}
