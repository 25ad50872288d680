//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};

/// Parse markup into a node tree
///
/// The whole input is treated as the content of an implicit root element,
/// so top-level text and elements may be freely mixed.
pub fn parse(input: &str) -> Result<Document, Vec<crate::ParseError>> {
    let len = input.len();

    let token_iter = lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Opening tag: name plus attributes
type OpenTag = (Spanned<String>, Vec<Attribute>);

/// Children and closing tag name, absent for `<name/>`
type ElementBody = Option<(Vec<Spanned<Node>>, Spanned<String>)>;

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Adjacent text, references and CDATA form a single text node
    let text = select! {
        Token::Text(s) => s,
    }
    .repeated()
    .at_least(1)
    .collect::<Vec<String>>()
    .map(|parts| Node::Text(parts.concat()))
    .labelled("text");

    let attribute_name = select! {
        Token::Name(n) => n,
    }
    .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
    .labelled("attribute name");

    let attribute_value = select! {
        Token::Value(v) => v,
    }
    .try_map(|raw, span: SimpleSpan| {
        lexer::unescape_attribute(&raw).map_err(|msg| Rich::custom(span, msg))
    })
    .map_with(|v, e| Spanned::new(v, span_range(&e.span())))
    .labelled("quoted attribute value");

    let attribute = attribute_name
        .then_ignore(just(Token::Equals))
        .then(attribute_value)
        .map(|(name, value)| Attribute { name, value });

    let open_tag = select! {
        Token::TagStart(n) => n,
    }
    .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
    .then(attribute.repeated().collect::<Vec<_>>())
    .try_map(|(name, attributes): OpenTag, span: SimpleSpan| {
        for (i, attr) in attributes.iter().enumerate() {
            if attributes[..i].iter().any(|a| a.name.node == attr.name.node) {
                return Err(Rich::custom(
                    span,
                    format!(
                        "duplicate attribute '{}' on <{}>",
                        attr.name.node, name.node
                    ),
                ));
            }
        }
        Ok((name, attributes))
    });

    let close_tag = select! {
        Token::EndTag(n) => n,
    }
    .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
    .labelled("closing tag");

    let node = recursive(|node| {
        let empty = just(Token::EmptyTagEnd).to(ElementBody::None);

        let body = just(Token::TagEnd)
            .ignore_then(node.repeated().collect::<Vec<_>>())
            .then(close_tag)
            .map(Some);

        let element = open_tag
            .then(choice((empty, body)))
            .try_map(|((name, attributes), body), span: SimpleSpan| {
                let children = match body {
                    None => Vec::new(),
                    Some((children, close)) => {
                        if close.node != name.node {
                            return Err(Rich::custom(
                                span,
                                format!(
                                    "closing tag </{}> does not match <{}>",
                                    close.node, name.node
                                ),
                            ));
                        }
                        children
                    }
                };
                Ok(Node::Element(Element {
                    name,
                    attributes,
                    children,
                }))
            });

        choice((text, element))
            .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
            .boxed()
    });

    node.repeated()
        .collect()
        .then_ignore(end())
        .map(|nodes| Document { nodes })
}
