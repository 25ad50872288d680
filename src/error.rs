//! Error types for template expansion, markup parsing and attribute values

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Malformed template or markup structure
///
/// Raised before anything is written to the terminal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("Invalid placeholder at {span:?}: {message}")]
    Placeholder { span: Span, message: String },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } | ParseError::Placeholder { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                report(
                    source,
                    filename,
                    span,
                    message,
                    &format!("{}{}", message, expected_str),
                )
            }
            ParseError::Placeholder { span, message } => {
                report(source, filename, span, "invalid placeholder", message)
            }
        }
    }
}

/// An attribute whose value does not convert to what its directive expects
///
/// Raised mid-render: output produced before the offending element stays on
/// the terminal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupValueError {
    #[error("<{element}> attribute '{attribute}': \"{value}\" is not an integer")]
    InvalidInteger {
        element: String,
        attribute: String,
        value: String,
        span: Span,
    },

    #[error("<{element}> attribute '{attribute}': \"{value}\" is not a boolean (expected true or false)")]
    InvalidBoolean {
        element: String,
        attribute: String,
        value: String,
        span: Span,
    },

    #[error("<{element}> attribute '{attribute}': unknown color \"{value}\"")]
    UnknownColor {
        element: String,
        attribute: String,
        value: String,
        span: Span,
    },

    #[error("<{element}> attribute '{attribute}': {value} is out of range ({reason})")]
    OutOfRange {
        element: String,
        attribute: String,
        value: String,
        reason: String,
        span: Span,
    },
}

impl MarkupValueError {
    pub fn span(&self) -> &Span {
        match self {
            MarkupValueError::InvalidInteger { span, .. }
            | MarkupValueError::InvalidBoolean { span, .. }
            | MarkupValueError::UnknownColor { span, .. }
            | MarkupValueError::OutOfRange { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        report(
            source,
            filename,
            self.span(),
            "invalid attribute value",
            &self.to_string(),
        )
    }
}

fn report(source: &str, filename: &str, span: &Span, message: &str, label: &str) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span.clone()))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);
    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}: {}", message, label),
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::Text(s) => format!("text \"{}\"", s.escape_debug()),
        Token::TagStart(name) => format!("tag '<{}'", name),
        Token::EndTag(name) => format!("closing tag '</{}>'", name),
        Token::Name(name) => format!("attribute name '{}'", name),
        Token::Equals => "'='".to_string(),
        Token::Value(v) => format!("attribute value \"{}\"", v),
        Token::TagEnd => "'>'".to_string(),
        Token::EmptyTagEnd => "'/>'".to_string(),
        Token::Invalid(s) => format!("invalid input '{}'", s.escape_debug()),
    }
}
