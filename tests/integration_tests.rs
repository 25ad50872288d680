//! Integration tests for the console markup parser and public API

use std::fmt::Display;

use console_markup::parser::{Node, Spanned};
use console_markup::terminal::{Color, MemoryTerminal, Operation, Terminal};
use console_markup::{load, parse, Console, Newline, ParseError, RenderConfig, Stylesheet};

fn element_names(nodes: &[Spanned<Node>]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|n| match &n.node {
            Node::Element(e) => Some(e.name().to_string()),
            Node::Text(_) => None,
        })
        .collect()
}

#[test]
fn test_plain_text() {
    let doc = parse("just text").expect("Should parse");
    assert_eq!(doc.nodes.len(), 1);
    assert!(!doc.has_elements());
}

#[test]
fn test_directives_and_text_interleave() {
    let input = r#"Status: <color fg="Green">ok</color> <beep/>"#;

    let doc = parse(input).expect("Should parse");
    assert_eq!(doc.nodes.len(), 4);
    assert_eq!(element_names(&doc.nodes), vec!["color", "beep"]);
}

#[test]
fn test_nested_elements() {
    let input = r#"
<window title="Build">
  <cursor x="0" y="0">
    <color fg="Yellow">warming up</color>
  </cursor>
</window>"#;

    let doc = parse(input).expect("Should parse");
    let window = doc
        .nodes
        .iter()
        .find_map(|n| match &n.node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
        .expect("Should have a window element");
    assert_eq!(window.name(), "window");
    assert_eq!(window.attribute("title").map(|a| a.value()), Some("Build"));
    assert_eq!(element_names(&window.children), vec!["cursor"]);
}

#[test]
fn test_attribute_quoting_and_escapes() {
    let doc = parse(r#"<window title='say "hi" &amp; bye'/>"#).expect("Should parse");
    let Node::Element(window) = &doc.nodes[0].node else {
        panic!("Expected an element");
    };
    assert_eq!(
        window.attribute("title").map(|a| a.value()),
        Some(r#"say "hi" & bye"#)
    );
}

#[test]
fn test_comments_are_dropped() {
    let doc = parse("a<!-- hidden -->b").expect("Should parse");
    assert_eq!(doc.nodes.len(), 1);
    assert_eq!(doc.nodes[0].node, Node::Text("ab".to_string()));
}

#[test]
fn test_mismatched_close_tag() {
    let errors = parse("<color>text</cursor>").unwrap_err();
    assert!(!errors.is_empty());
    assert!(matches!(errors[0], ParseError::Syntax { .. }));
}

#[test]
fn test_stray_close_tag() {
    assert!(parse("text</color>").is_err());
}

#[test]
fn test_unquoted_attribute_rejected() {
    assert!(parse("<cursor x=5/>").is_err());
}

#[test]
fn test_load_normalizes_newlines() {
    let doc = load("one\r\ntwo\rthree", None, Newline::CrLf).expect("Should load");
    assert_eq!(
        doc.nodes[0].node,
        Node::Text("one\r\ntwo\r\nthree".to_string())
    );
}

#[test]
fn test_load_reports_bad_placeholder() {
    let args: [&dyn Display; 1] = [&1];
    let errors = load("{0} {x}", Some(&args[..]), Newline::Lf).unwrap_err();
    assert!(matches!(errors[0], ParseError::Placeholder { .. }));
}

#[test]
fn test_parse_error_formats_with_source() {
    let source = "<color fg=\"Red\">open";
    let errors = parse(source).unwrap_err();
    let report = errors[0].format(source, "inline.txt");
    assert!(report.contains("inline.txt"));
}

#[test]
fn test_console_session() {
    let terminal = MemoryTerminal::default().with_input(["Ada"]);
    let config = RenderConfig::new()
        .with_newline(Newline::Lf)
        .with_stylesheet(Stylesheet::builtin());
    let mut console = Console::with_config(terminal, config);

    console
        .write_line(r#"<color fg="info">Welcome</color>"#)
        .unwrap();
    let name = console
        .write_and_read_line_args("{0}: ", &[&"Name"])
        .unwrap();
    assert_eq!(name.as_deref(), Some("Ada"));

    console
        .write_line_args(r#"Hello, <color fg="success">{0}</color>!"#, &[&"Ada"])
        .unwrap();

    let terminal = console.into_inner();
    assert_eq!(terminal.output(), "Welcome\nName: Hello, Ada!\n");
    assert!(terminal
        .operations()
        .contains(&Operation::SetForeground(Some(Color::Cyan))));
    assert!(terminal
        .operations()
        .contains(&Operation::SetForeground(Some(Color::Green))));
}

#[test]
fn test_console_value_error_keeps_earlier_output() {
    let mut console = Console::new(MemoryTerminal::default());
    assert!(console.write(r#"ok<color fg="puce">x</color>"#).is_err());
    assert_eq!(console.terminal().output(), "ok");
    assert_eq!(console.terminal_mut().foreground().unwrap(), None);
}
