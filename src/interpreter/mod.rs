//! Markup interpreter
//!
//! Walks the node tree depth-first. Text is written verbatim. An element
//! applies its directive, and if it has children the terminal state is
//! captured before the directive runs and restored once the children are
//! done, except for the cursor position when the element itself moved the
//! cursor. Leaf elements are not restored: their effects persist.
//!
//! There is no state machine here beyond the recursion depth; the call stack
//! holds the snapshots.

mod directive;
mod state;

pub use directive::Directive;
pub use state::TerminalState;

use tracing::trace;

use crate::parser::{Document, Element, Node, Spanned};
use crate::stylesheet::Stylesheet;
use crate::terminal::Terminal;
use crate::RenderError;

/// Per-render walk state
pub struct RenderContext<'a, T: Terminal + ?Sized> {
    terminal: &'a mut T,
    stylesheet: &'a Stylesheet,
    depth: usize,
}

impl<'a, T: Terminal + ?Sized> RenderContext<'a, T> {
    pub fn new(terminal: &'a mut T, stylesheet: &'a Stylesheet) -> Self {
        Self {
            terminal,
            stylesheet,
            depth: 0,
        }
    }

    /// Current nesting depth (0 at the top level)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Execute a document
    pub fn run(&mut self, document: &Document) -> Result<(), RenderError> {
        self.nodes(&document.nodes)
    }

    fn nodes(&mut self, nodes: &[Spanned<Node>]) -> Result<(), RenderError> {
        for node in nodes {
            match &node.node {
                Node::Text(text) => self.terminal.write_text(text)?,
                Node::Element(element) => self.element(element)?,
            }
        }
        Ok(())
    }

    fn element(&mut self, element: &Element) -> Result<(), RenderError> {
        let saved = if element.has_children() {
            Some(TerminalState::capture(self.terminal)?)
        } else {
            None
        };

        let cursor_moved = match Directive::from_name(element.name()) {
            Some(directive) => {
                trace!(depth = self.depth, ?directive, span = ?element.name.span, "apply directive");
                directive.apply(element, self.terminal, self.stylesheet)?
            }
            None => {
                trace!(depth = self.depth, name = element.name(), "transparent element");
                false
            }
        };

        if let Some(state) = saved {
            self.depth += 1;
            self.nodes(&element.children)?;
            self.depth -= 1;
            state.restore(self.terminal, !cursor_moved)?;
            trace!(depth = self.depth, ?state, restore_position = !cursor_moved, "restore");
        }
        Ok(())
    }
}

/// Execute a parsed document against a terminal
pub fn execute<T: Terminal + ?Sized>(
    document: &Document,
    terminal: &mut T,
    stylesheet: &Stylesheet,
) -> Result<(), RenderError> {
    RenderContext::new(terminal, stylesheet).run(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::terminal::{Color, MemoryTerminal, Operation, Position};
    use pretty_assertions::assert_eq;

    fn run(source: &str, term: &mut MemoryTerminal) -> Result<(), RenderError> {
        let doc = parse(source).expect("Should parse");
        execute(&doc, term, &Stylesheet::new())
    }

    #[test]
    fn test_text_only_issues_writes() {
        let mut term = MemoryTerminal::default();
        run("plain text", &mut term).unwrap();
        assert_eq!(term.operations(), &[Operation::Write("plain text".into())]);
    }

    #[test]
    fn test_element_scope_restores_color() {
        let mut term = MemoryTerminal::default();
        run(r#"<color fg="Red">a</color>b"#, &mut term).unwrap();
        assert_eq!(term.foreground().unwrap(), None);
        assert_eq!(
            &term.operations()[..3],
            &[
                Operation::SetForeground(Some(Color::Red)),
                Operation::Write("a".into()),
                Operation::SetForeground(None),
            ]
        );
    }

    #[test]
    fn test_nested_scopes_unwind_in_order() {
        let mut term = MemoryTerminal::default();
        run(
            r#"<color fg="Red"><color bg="Blue">x</color><color fg="Green"/>y</color>"#,
            &mut term,
        )
        .unwrap();
        let changes: Vec<_> = term.state_changes().cloned().collect();
        assert_eq!(
            changes,
            vec![
                Operation::SetForeground(Some(Color::Red)),
                Operation::SetBackground(Some(Color::Blue)),
                Operation::SetBackground(None),
                Operation::SetCursorPosition(Position::new(0, 0)),
                Operation::SetForeground(Some(Color::Green)),
                Operation::SetForeground(None),
                Operation::SetCursorPosition(Position::new(0, 0)),
            ]
        );
    }

    #[test]
    fn test_depth_returns_to_zero() {
        let mut term = MemoryTerminal::default();
        let doc = parse("<a><b><c>deep</c></b></a>").expect("Should parse");
        let stylesheet = Stylesheet::new();
        let mut ctx = RenderContext::new(&mut term, &stylesheet);
        ctx.run(&doc).unwrap();
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_cursor_element_keeps_its_move() {
        let mut term = MemoryTerminal::default();
        run(r#"<cursor x="2" y="1">ab</cursor>"#, &mut term).unwrap();
        assert_eq!(term.cursor_position().unwrap(), Position::new(4, 1));
    }

    #[test]
    fn test_cursor_visibility_scoped_to_children() {
        let mut term = MemoryTerminal::default();
        run(r#"<cursor show="false">working</cursor>"#, &mut term).unwrap();
        assert!(term.cursor_visible().unwrap());
    }

    #[test]
    fn test_leaf_cursor_visibility_persists() {
        let mut term = MemoryTerminal::default();
        run(r#"<cursor show="false"/>"#, &mut term).unwrap();
        assert!(!term.cursor_visible().unwrap());
    }
}
