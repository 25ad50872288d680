//! Template expansion: positional substitution and newline normalization
//!
//! Placeholders are `{index}` or `{index,alignment}`. A positive alignment
//! right-aligns the argument in a field of that width, a negative one
//! left-aligns it. `{{` and `}}` produce literal braces.

use std::fmt::Display;

use crate::error::ParseError;

/// Line terminator written for every line break in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    /// The host's native sequence
    #[default]
    Native,
    Lf,
    CrLf,
}

impl Newline {
    pub fn as_str(self) -> &'static str {
        match self {
            Newline::Native => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }
}

/// Replace `\r\n` and bare `\r` with `\n`, then `\n` with `newline`
pub fn normalize_newlines(text: &str, newline: Newline) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    match newline.as_str() {
        "\n" => unified,
        other => unified.replace('\n', other),
    }
}

/// Alignment widths at or beyond this are rejected
const MAX_ALIGNMENT: u32 = 1_000_000;

/// Substitute positional arguments into a template
pub fn expand(template: &str, args: &[&dyn Display]) -> Result<String, ParseError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            '{' => {
                if chars.next_if(|&(_, c)| c == '{').is_some() {
                    out.push('{');
                    continue;
                }
                let mut body = String::new();
                let end = loop {
                    match chars.next() {
                        Some((i, '}')) => break i + 1,
                        Some((_, c)) => body.push(c),
                        None => {
                            return Err(placeholder(start..template.len(), "unterminated '{'"));
                        }
                    }
                };
                let span = start..end;
                substitute(&mut out, &body, args, span)?;
            }
            '}' => {
                if chars.next_if(|&(_, c)| c == '}').is_none() {
                    return Err(placeholder(
                        start..start + 1,
                        "unmatched '}' (use '}}' for a literal brace)",
                    ));
                }
                out.push('}');
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

fn substitute(
    out: &mut String,
    body: &str,
    args: &[&dyn Display],
    span: std::ops::Range<usize>,
) -> Result<(), ParseError> {
    if body.contains(':') {
        return Err(placeholder(span, "format strings are not supported"));
    }

    let (index, alignment) = match body.split_once(',') {
        Some((index, alignment)) => (index, Some(alignment)),
        None => (body, None),
    };

    let index: usize = index.trim().parse().map_err(|_| {
        placeholder(
            span.clone(),
            &format!("'{}' is not an argument index", index.trim()),
        )
    })?;
    let arg = args.get(index).ok_or_else(|| {
        placeholder(
            span.clone(),
            &format!(
                "argument index {} is out of range ({} argument{})",
                index,
                args.len(),
                if args.len() == 1 { "" } else { "s" }
            ),
        )
    })?;

    match alignment {
        None => out.push_str(&arg.to_string()),
        Some(alignment) => {
            let alignment: i32 = alignment.trim().parse().map_err(|_| {
                placeholder(
                    span.clone(),
                    &format!("'{}' is not an alignment", alignment.trim()),
                )
            })?;
            if alignment.unsigned_abs() >= MAX_ALIGNMENT {
                return Err(placeholder(
                    span,
                    &format!("alignment must be less than {} in magnitude", MAX_ALIGNMENT),
                ));
            }
            let width = alignment.unsigned_abs() as usize;
            let value = arg.to_string();
            if alignment < 0 {
                out.push_str(&format!("{:<width$}", value, width = width));
            } else {
                out.push_str(&format!("{:>width$}", value, width = width));
            }
        }
    }
    Ok(())
}

fn placeholder(span: std::ops::Range<usize>, message: &str) -> ParseError {
    ParseError::Placeholder {
        span,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_positional() {
        let out = expand("{0} + {1} = {2}", &[&1, &2, &3]).unwrap();
        assert_eq!(out, "1 + 2 = 3");
    }

    #[test]
    fn test_expand_reuses_and_reorders() {
        let out = expand("{1}{0}{1}", &[&"a", &"b"]).unwrap();
        assert_eq!(out, "bab");
    }

    #[test]
    fn test_expand_alignment() {
        assert_eq!(expand("[{0,5}]", &[&"ab"]).unwrap(), "[   ab]");
        assert_eq!(expand("[{0,-5}]", &[&"ab"]).unwrap(), "[ab   ]");
    }

    #[test]
    fn test_expand_alignment_is_bounded() {
        let err = expand("{0,2000000000}", &[&"x"]).unwrap_err();
        assert_eq!(err.span(), &(0..14));
        assert!(expand("{0,-1000000}", &[&"x"]).is_err());
        assert_eq!(expand("{0,999999}", &[&"x"]).unwrap().len(), 999_999);
    }

    #[test]
    fn test_expand_escaped_braces() {
        assert_eq!(expand("{{{0}}}", &[&7]).unwrap(), "{7}");
    }

    #[test]
    fn test_expand_leaves_markup_alone() {
        let out = expand(r#"<color fg="{0}">{1}</color>"#, &[&"Red", &"hi"]).unwrap();
        assert_eq!(out, r#"<color fg="Red">hi</color>"#);
    }

    #[test]
    fn test_expand_index_out_of_range() {
        let err = expand("ok {2}", &[&1]).unwrap_err();
        assert_eq!(err.span(), &(3..6));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_expand_unterminated_placeholder() {
        let err = expand("abc {0", &[&1]).unwrap_err();
        assert_eq!(err.span(), &(4..6));
    }

    #[test]
    fn test_expand_unmatched_close_brace() {
        let err = expand("a } b", &[]).unwrap_err();
        assert_eq!(err.span(), &(2..3));
    }

    #[test]
    fn test_expand_rejects_format_strings() {
        let err = expand("{0:X}", &[&255]).unwrap_err();
        assert!(err.to_string().contains("format strings"));
    }

    #[test]
    fn test_expand_rejects_non_numeric_index() {
        assert!(expand("{name}", &[&1]).is_err());
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd", Newline::Lf), "a\nb\nc\nd");
        assert_eq!(normalize_newlines("a\r\nb\rc\nd", Newline::CrLf), "a\r\nb\r\nc\r\nd");
    }

    #[test]
    fn test_native_newline() {
        let expected = if cfg!(windows) { "\r\n" } else { "\n" };
        assert_eq!(Newline::Native.as_str(), expected);
    }
}
