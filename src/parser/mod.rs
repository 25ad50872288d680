//! Parser/loader for console markup
//!
//! Loading a template is three steps: positional substitution (only when
//! arguments are given), newline normalization, then parsing the result as
//! the content of an implicit root element.

pub mod ast;
mod grammar;
pub mod lexer;

use std::fmt::Display;

pub use ast::*;
pub use grammar::parse;

use crate::error::ParseError;
use crate::template::{self, Newline};

/// Expand arguments and normalize line breaks, producing parser input
pub fn prepare(
    template: &str,
    args: Option<&[&dyn Display]>,
    newline: Newline,
) -> Result<String, ParseError> {
    let expanded = match args {
        Some(args) => template::expand(template, args)?,
        None => template.to_string(),
    };
    Ok(template::normalize_newlines(&expanded, newline))
}

/// Prepare and parse a template
pub fn load(
    template: &str,
    args: Option<&[&dyn Display]>,
    newline: Newline,
) -> Result<Document, Vec<ParseError>> {
    let source = prepare(template, args, newline).map_err(|e| vec![e])?;
    parse(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_args_keeps_braces() {
        let doc = load("{0} {", None, Newline::Lf).expect("Should load");
        assert_eq!(doc.nodes[0].node, Node::Text("{0} {".to_string()));
    }

    #[test]
    fn test_load_substitutes_before_parsing() {
        let doc = load(r#"<color fg="{0}"/>"#, Some(&[&"Red"]), Newline::Lf).expect("Should load");
        match &doc.nodes[0].node {
            Node::Element(e) => assert_eq!(e.attribute("fg").map(|a| a.value()), Some("Red")),
            other => panic!("Expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_load_substituted_markup_is_parsed() {
        let doc = load("{0}", Some(&[&"<beep/>"]), Newline::Lf).expect("Should load");
        assert!(doc.has_elements());
    }

    #[test]
    fn test_load_normalizes_newlines() {
        let doc = load("a\r\nb\rc", None, Newline::CrLf).expect("Should load");
        assert_eq!(doc.nodes[0].node, Node::Text("a\r\nb\r\nc".to_string()));
    }

    #[test]
    fn test_load_reports_placeholder_errors() {
        let errors = load("{1}", Some(&[&"only one"]), Newline::Lf).unwrap_err();
        assert!(matches!(errors[0], ParseError::Placeholder { .. }));
    }
}
