//! Console Markup - declarative formatting for terminal output
//!
//! Templates are plain text interspersed with directive elements that change
//! colors, move or reshape the cursor, adjust the window and beep:
//!
//! ```rust
//! use console_markup::terminal::{MemoryTerminal, Terminal};
//! use console_markup::Console;
//!
//! let mut console = Console::new(MemoryTerminal::default());
//! console
//!     .write_line_args(r#"<color fg="Red">{0}</color>"#, &[&"failed"])
//!     .unwrap();
//!
//! let term = console.terminal_mut();
//! assert!(term.output().starts_with("failed"));
//! assert_eq!(term.foreground().unwrap(), None);
//! ```
//!
//! Rendering is synchronous and writes incrementally: a value error in the
//! middle of a template leaves the output before it on the terminal.
//! A terminal is not meant to be shared across threads without external
//! serialization around each call.

pub mod error;
pub mod interpreter;
pub mod parser;
pub mod stylesheet;
pub mod template;
pub mod terminal;

pub use error::{MarkupValueError, ParseError};
pub use parser::{load, parse, Document};
pub use stylesheet::Stylesheet;
pub use template::Newline;

use std::fmt::Display;
use std::io;

use thiserror::Error;
use tracing::debug;

use terminal::{ConsoleTerminal, Terminal};

/// Errors that can occur during a render
#[derive(Debug, Error)]
pub enum RenderError {
    /// Malformed template or markup; nothing was written
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// An attribute value did not convert; earlier output remains
    #[error("invalid markup value: {0}")]
    Value(#[from] MarkupValueError),

    /// The terminal device failed
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

impl From<Vec<ParseError>> for RenderError {
    fn from(errors: Vec<ParseError>) -> Self {
        RenderError::Parse(errors)
    }
}

impl From<ParseError> for RenderError {
    fn from(error: ParseError) -> Self {
        RenderError::Parse(vec![error])
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration for the render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Color aliases available to `fg`/`bg`
    pub stylesheet: Stylesheet,
    /// Line terminator written for line breaks
    pub newline: Newline,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stylesheet for color aliases
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Set the line terminator
    pub fn with_newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }
}

/// Render a template to a terminal
///
/// Positional substitution only happens when `args` is `Some`; otherwise
/// braces in the template are literal. The template is fully parsed before
/// anything is written, so a [`RenderError::Parse`] leaves the terminal
/// untouched.
pub fn render<T: Terminal + ?Sized>(
    terminal: &mut T,
    template: &str,
    args: Option<&[&dyn Display]>,
    config: &RenderConfig,
) -> Result<(), RenderError> {
    let document = load(template, args, config.newline)?;
    interpreter::execute(&document, terminal, &config.stylesheet)?;
    terminal.flush()?;
    debug!(nodes = document.nodes.len(), "rendered template");
    Ok(())
}

/// A terminal paired with a render configuration
///
/// The `write*` methods render markup; `write_line*` append a line break;
/// `write_and_read_line*` read one line of input after all output has been
/// flushed.
pub struct Console<T: Terminal> {
    terminal: T,
    config: RenderConfig,
}

impl Console<ConsoleTerminal> {
    /// A console on the process's stdout
    pub fn stdout() -> Self {
        Self::new(ConsoleTerminal::new())
    }
}

impl<T: Terminal> Console<T> {
    pub fn new(terminal: T) -> Self {
        Self::with_config(terminal, RenderConfig::default())
    }

    pub fn with_config(terminal: T, config: RenderConfig) -> Self {
        Self { terminal, config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn into_inner(self) -> T {
        self.terminal
    }

    /// Render a template taken literally
    pub fn write(&mut self, template: &str) -> Result<(), RenderError> {
        render(&mut self.terminal, template, None, &self.config)
    }

    /// Render a template after positional substitution
    pub fn write_args(&mut self, template: &str, args: &[&dyn Display]) -> Result<(), RenderError> {
        render(&mut self.terminal, template, Some(args), &self.config)
    }

    pub fn write_line(&mut self, template: &str) -> Result<(), RenderError> {
        self.write(&format!("{}\n", template))
    }

    pub fn write_line_args(
        &mut self,
        template: &str,
        args: &[&dyn Display],
    ) -> Result<(), RenderError> {
        self.write_args(&format!("{}\n", template), args)
    }

    /// Render, then read one line of input
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn write_and_read_line(&mut self, template: &str) -> Result<Option<String>, RenderError> {
        self.write(template)?;
        Ok(self.terminal.read_line()?)
    }

    pub fn write_and_read_line_args(
        &mut self,
        template: &str,
        args: &[&dyn Display],
    ) -> Result<Option<String>, RenderError> {
        self.write_args(template, args)?;
        Ok(self.terminal.read_line()?)
    }
}
