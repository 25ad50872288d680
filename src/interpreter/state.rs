//! Snapshot of the terminal properties markup can change and later undo

use std::io;

use crate::terminal::{Color, Position, Terminal};

/// Colors, cursor position, cursor size and cursor visibility
///
/// Window and buffer geometry and the title are deliberately absent: they
/// are never rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalState {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub cursor: Position,
    pub cursor_size: u8,
    pub cursor_visible: bool,
}

impl TerminalState {
    /// Read the current state from the device
    pub fn capture<T: Terminal + ?Sized>(terminal: &mut T) -> io::Result<Self> {
        Ok(Self {
            foreground: terminal.foreground()?,
            background: terminal.background()?,
            cursor: terminal.cursor_position()?,
            cursor_size: terminal.cursor_size()?,
            cursor_visible: terminal.cursor_visible()?,
        })
    }

    /// Write this snapshot back, touching only channels that changed
    ///
    /// The cursor position is left alone unless `restore_position` is set.
    pub fn restore<T: Terminal + ?Sized>(
        &self,
        terminal: &mut T,
        restore_position: bool,
    ) -> io::Result<()> {
        let current = Self::capture(terminal)?;

        if current.foreground != self.foreground {
            terminal.set_foreground(self.foreground)?;
        }
        if current.background != self.background {
            terminal.set_background(self.background)?;
        }
        if current.cursor_size != self.cursor_size {
            terminal.set_cursor_size(self.cursor_size)?;
        }
        if current.cursor_visible != self.cursor_visible {
            terminal.set_cursor_visible(self.cursor_visible)?;
        }
        if restore_position {
            // Buffer geometry is never rolled back, so it may have shrunk
            // under the saved position
            let buffer = terminal.buffer_size()?;
            let cursor = Position::new(
                self.cursor.column.min(buffer.width.saturating_sub(1)),
                self.cursor.row.min(buffer.height.saturating_sub(1)),
            );
            if current.cursor != cursor {
                terminal.set_cursor_position(cursor)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{MemoryTerminal, Operation, Size};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_capture_reads_device() {
        let mut term = MemoryTerminal::default();
        term.set_foreground(Some(Color::Red)).unwrap();
        term.set_cursor_position(Position::new(4, 2)).unwrap();
        term.set_cursor_visible(false).unwrap();

        let state = TerminalState::capture(&mut term).unwrap();
        assert_eq!(state.foreground, Some(Color::Red));
        assert_eq!(state.background, None);
        assert_eq!(state.cursor, Position::new(4, 2));
        assert_eq!(state.cursor_size, 25);
        assert!(!state.cursor_visible);
    }

    #[test]
    fn test_restore_unchanged_state_is_silent() {
        let mut term = MemoryTerminal::default();
        let state = TerminalState::capture(&mut term).unwrap();
        state.restore(&mut term, true).unwrap();
        assert!(term.operations().is_empty());
    }

    #[test]
    fn test_restore_writes_changed_channels() {
        let mut term = MemoryTerminal::default();
        let state = TerminalState::capture(&mut term).unwrap();
        term.set_foreground(Some(Color::Green)).unwrap();
        term.set_cursor_size(100).unwrap();
        term.write_text("abc").unwrap();
        term.clear_operations();

        state.restore(&mut term, true).unwrap();
        assert_eq!(
            term.operations(),
            &[
                Operation::SetForeground(None),
                Operation::SetCursorSize(25),
                Operation::SetCursorPosition(Position::new(0, 0)),
            ]
        );
    }

    #[test]
    fn test_restore_clamps_position_to_shrunk_buffer() {
        let mut term = MemoryTerminal::default();
        term.write_text("abcdefgh").unwrap();
        let state = TerminalState::capture(&mut term).unwrap();
        term.set_buffer_size(Size::new(4, 25)).unwrap();
        term.write_text("x").unwrap();
        term.clear_operations();

        state.restore(&mut term, true).unwrap();
        assert_eq!(
            term.operations(),
            &[Operation::SetCursorPosition(Position::new(3, 0))]
        );
    }

    #[test]
    fn test_restore_can_skip_position() {
        let mut term = MemoryTerminal::default();
        let state = TerminalState::capture(&mut term).unwrap();
        term.write_text("abc").unwrap();
        term.set_background(Some(Color::Blue)).unwrap();

        state.restore(&mut term, false).unwrap();
        assert_eq!(term.background().unwrap(), None);
        assert_eq!(term.cursor_position().unwrap(), Position::new(3, 0));
    }
}
