//! In-memory recording terminal

use std::collections::VecDeque;
use std::io;

use super::{Color, Position, Size, Terminal, Tone};

/// A mutating call recorded by [`MemoryTerminal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    SetForeground(Option<Color>),
    SetBackground(Option<Color>),
    SetCursorPosition(Position),
    SetCursorSize(u8),
    SetCursorVisible(bool),
    SetWindowPosition(Position),
    SetWindowSize(Size),
    SetBufferSize(Size),
    SetTitle(String),
    Write(String),
    Beep,
    Tone(Tone),
}

/// Deterministic terminal that keeps its whole state in memory
///
/// Text writes advance the cursor the way a console does: `\n` moves to the
/// start of the next row, `\r` to the start of the current row, and output
/// wraps at the buffer width. The row is clamped to the last buffer row.
#[derive(Debug, Clone)]
pub struct MemoryTerminal {
    foreground: Option<Color>,
    background: Option<Color>,
    cursor: Position,
    cursor_size: u8,
    cursor_visible: bool,
    window_position: Position,
    window_size: Size,
    buffer_size: Size,
    title: String,
    output: String,
    operations: Vec<Operation>,
    input: VecDeque<String>,
}

impl Default for MemoryTerminal {
    fn default() -> Self {
        Self::new(Size::new(80, 25))
    }
}

impl MemoryTerminal {
    /// Create a terminal whose window and buffer both have the given size
    pub fn new(size: Size) -> Self {
        Self {
            foreground: None,
            background: None,
            cursor: Position::default(),
            cursor_size: 25,
            cursor_visible: true,
            window_position: Position::default(),
            window_size: size,
            buffer_size: size,
            title: String::new(),
            output: String::new(),
            operations: Vec::new(),
            input: VecDeque::new(),
        }
    }

    /// Queue lines to be returned by [`Terminal::read_line`]
    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.extend(lines.into_iter().map(Into::into));
        self
    }

    /// All text written so far, concatenated
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Every mutating call in the order it happened
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Recorded calls other than text writes
    pub fn state_changes(&self) -> impl Iterator<Item = &Operation> {
        self.operations
            .iter()
            .filter(|op| !matches!(op, Operation::Write(_)))
    }

    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    fn advance(&mut self, ch: char) {
        let last_row = self.buffer_size.height.saturating_sub(1);
        match ch {
            '\n' => {
                self.cursor.column = 0;
                self.cursor.row = (self.cursor.row + 1).min(last_row);
            }
            '\r' => self.cursor.column = 0,
            _ => {
                self.cursor.column += 1;
                if self.cursor.column >= self.buffer_size.width {
                    self.cursor.column = 0;
                    self.cursor.row = (self.cursor.row + 1).min(last_row);
                }
            }
        }
    }
}

impl Terminal for MemoryTerminal {
    fn foreground(&mut self) -> io::Result<Option<Color>> {
        Ok(self.foreground)
    }

    fn set_foreground(&mut self, color: Option<Color>) -> io::Result<()> {
        self.foreground = color;
        self.operations.push(Operation::SetForeground(color));
        Ok(())
    }

    fn background(&mut self) -> io::Result<Option<Color>> {
        Ok(self.background)
    }

    fn set_background(&mut self, color: Option<Color>) -> io::Result<()> {
        self.background = color;
        self.operations.push(Operation::SetBackground(color));
        Ok(())
    }

    fn cursor_position(&mut self) -> io::Result<Position> {
        Ok(self.cursor)
    }

    fn set_cursor_position(&mut self, position: Position) -> io::Result<()> {
        if position.column >= self.buffer_size.width || position.row >= self.buffer_size.height {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "cursor position {},{} is outside the {}x{} buffer",
                    position.column, position.row, self.buffer_size.width, self.buffer_size.height
                ),
            ));
        }
        self.cursor = position;
        self.operations.push(Operation::SetCursorPosition(position));
        Ok(())
    }

    fn cursor_size(&mut self) -> io::Result<u8> {
        Ok(self.cursor_size)
    }

    fn set_cursor_size(&mut self, size: u8) -> io::Result<()> {
        self.cursor_size = size;
        self.operations.push(Operation::SetCursorSize(size));
        Ok(())
    }

    fn cursor_visible(&mut self) -> io::Result<bool> {
        Ok(self.cursor_visible)
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.cursor_visible = visible;
        self.operations.push(Operation::SetCursorVisible(visible));
        Ok(())
    }

    fn window_position(&mut self) -> io::Result<Position> {
        Ok(self.window_position)
    }

    fn set_window_position(&mut self, position: Position) -> io::Result<()> {
        self.window_position = position;
        self.operations.push(Operation::SetWindowPosition(position));
        Ok(())
    }

    fn window_size(&mut self) -> io::Result<Size> {
        Ok(self.window_size)
    }

    fn set_window_size(&mut self, size: Size) -> io::Result<()> {
        self.window_size = size;
        self.operations.push(Operation::SetWindowSize(size));
        Ok(())
    }

    fn buffer_size(&mut self) -> io::Result<Size> {
        Ok(self.buffer_size)
    }

    fn set_buffer_size(&mut self, size: Size) -> io::Result<()> {
        self.buffer_size = size;
        self.cursor.column = self.cursor.column.min(size.width.saturating_sub(1));
        self.cursor.row = self.cursor.row.min(size.height.saturating_sub(1));
        self.operations.push(Operation::SetBufferSize(size));
        Ok(())
    }

    fn title(&mut self) -> io::Result<String> {
        Ok(self.title.clone())
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.title = title.to_string();
        self.operations.push(Operation::SetTitle(self.title.clone()));
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        for ch in text.chars() {
            self.advance(ch);
        }
        self.output.push_str(text);
        self.operations.push(Operation::Write(text.to_string()));
        Ok(())
    }

    fn beep(&mut self) -> io::Result<()> {
        self.operations.push(Operation::Beep);
        Ok(())
    }

    fn tone(&mut self, tone: Tone) -> io::Result<()> {
        self.operations.push(Operation::Tone(tone));
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
