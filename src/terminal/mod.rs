//! Abstract console device consumed by the interpreter
//!
//! The interpreter never talks to stdout directly. Everything it does goes
//! through [`Terminal`], so the same markup can drive a real console
//! ([`ConsoleTerminal`]) or an in-memory recording device ([`MemoryTerminal`]).

mod console;
mod memory;

pub use console::ConsoleTerminal;
pub use memory::{MemoryTerminal, Operation};

use std::fmt;
use std::io;
use std::time::Duration;

/// The sixteen console colors
///
/// Declaration order matches the numeric values accepted in markup
/// (`fg="12"` is [`Color::Red`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

impl Color {
    pub const ALL: [Color; 16] = [
        Color::Black,
        Color::DarkBlue,
        Color::DarkGreen,
        Color::DarkCyan,
        Color::DarkRed,
        Color::DarkMagenta,
        Color::DarkYellow,
        Color::Gray,
        Color::DarkGray,
        Color::Blue,
        Color::Green,
        Color::Cyan,
        Color::Red,
        Color::Magenta,
        Color::Yellow,
        Color::White,
    ];

    /// Canonical name, as written in markup
    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::DarkBlue => "DarkBlue",
            Color::DarkGreen => "DarkGreen",
            Color::DarkCyan => "DarkCyan",
            Color::DarkRed => "DarkRed",
            Color::DarkMagenta => "DarkMagenta",
            Color::DarkYellow => "DarkYellow",
            Color::Gray => "Gray",
            Color::DarkGray => "DarkGray",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Cyan => "Cyan",
            Color::Red => "Red",
            Color::Magenta => "Magenta",
            Color::Yellow => "Yellow",
            Color::White => "White",
        }
    }

    /// Look up a color by name (case-insensitive) or by its numeric value
    ///
    /// `Grey`/`DarkGrey` are accepted as alternative spellings.
    pub fn from_name(name: &str) -> Option<Color> {
        let name = name.trim();
        if let Ok(index) = name.parse::<usize>() {
            return Color::ALL.get(index).copied();
        }
        let lowered = name.to_ascii_lowercase().replace("grey", "gray");
        Color::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(&lowered))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cursor or window position in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub column: u16,
    pub row: u16,
}

impl Position {
    pub fn new(column: u16, row: u16) -> Self {
        Self { column, row }
    }
}

/// Window or buffer dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// An audible tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    /// Frequency in hertz
    pub frequency: u32,
    pub duration: Duration,
}

/// The console capability the interpreter drives
///
/// Getters must report the device's actual state: the interpreter snapshots
/// them before descending into an element and writes them back afterwards.
/// Every method takes `&mut self` because querying a real device may need to
/// flush pending output first.
///
/// A `None` color means the device's default color.
pub trait Terminal {
    fn foreground(&mut self) -> io::Result<Option<Color>>;
    fn set_foreground(&mut self, color: Option<Color>) -> io::Result<()>;

    fn background(&mut self) -> io::Result<Option<Color>>;
    fn set_background(&mut self, color: Option<Color>) -> io::Result<()>;

    fn cursor_position(&mut self) -> io::Result<Position>;
    fn set_cursor_position(&mut self, position: Position) -> io::Result<()>;

    /// Cursor height as a percentage of the cell (1-100)
    fn cursor_size(&mut self) -> io::Result<u8>;
    fn set_cursor_size(&mut self, size: u8) -> io::Result<()>;

    fn cursor_visible(&mut self) -> io::Result<bool>;
    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()>;

    fn window_position(&mut self) -> io::Result<Position>;
    fn set_window_position(&mut self, position: Position) -> io::Result<()>;

    fn window_size(&mut self) -> io::Result<Size>;
    fn set_window_size(&mut self, size: Size) -> io::Result<()>;

    fn buffer_size(&mut self) -> io::Result<Size>;
    fn set_buffer_size(&mut self, size: Size) -> io::Result<()>;

    fn title(&mut self) -> io::Result<String>;
    fn set_title(&mut self, title: &str) -> io::Result<()>;

    /// Write text verbatim at the cursor
    fn write_text(&mut self, text: &str) -> io::Result<()>;

    /// Emit the default system beep
    fn beep(&mut self) -> io::Result<()>;

    /// Emit a tone of the given frequency and duration
    fn tone(&mut self, tone: Tone) -> io::Result<()>;

    /// Read one line of input, without its line terminator
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    fn flush(&mut self) -> io::Result<()>;
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn foreground(&mut self) -> io::Result<Option<Color>> {
        (**self).foreground()
    }
    fn set_foreground(&mut self, color: Option<Color>) -> io::Result<()> {
        (**self).set_foreground(color)
    }
    fn background(&mut self) -> io::Result<Option<Color>> {
        (**self).background()
    }
    fn set_background(&mut self, color: Option<Color>) -> io::Result<()> {
        (**self).set_background(color)
    }
    fn cursor_position(&mut self) -> io::Result<Position> {
        (**self).cursor_position()
    }
    fn set_cursor_position(&mut self, position: Position) -> io::Result<()> {
        (**self).set_cursor_position(position)
    }
    fn cursor_size(&mut self) -> io::Result<u8> {
        (**self).cursor_size()
    }
    fn set_cursor_size(&mut self, size: u8) -> io::Result<()> {
        (**self).set_cursor_size(size)
    }
    fn cursor_visible(&mut self) -> io::Result<bool> {
        (**self).cursor_visible()
    }
    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        (**self).set_cursor_visible(visible)
    }
    fn window_position(&mut self) -> io::Result<Position> {
        (**self).window_position()
    }
    fn set_window_position(&mut self, position: Position) -> io::Result<()> {
        (**self).set_window_position(position)
    }
    fn window_size(&mut self) -> io::Result<Size> {
        (**self).window_size()
    }
    fn set_window_size(&mut self, size: Size) -> io::Result<()> {
        (**self).set_window_size(size)
    }
    fn buffer_size(&mut self) -> io::Result<Size> {
        (**self).buffer_size()
    }
    fn set_buffer_size(&mut self, size: Size) -> io::Result<()> {
        (**self).set_buffer_size(size)
    }
    fn title(&mut self) -> io::Result<String> {
        (**self).title()
    }
    fn set_title(&mut self, title: &str) -> io::Result<()> {
        (**self).set_title(title)
    }
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        (**self).write_text(text)
    }
    fn beep(&mut self) -> io::Result<()> {
        (**self).beep()
    }
    fn tone(&mut self, tone: Tone) -> io::Result<()> {
        (**self).tone(tone)
    }
    fn read_line(&mut self) -> io::Result<Option<String>> {
        (**self).read_line()
    }
    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_name_is_case_insensitive() {
        assert_eq!(Color::from_name("red"), Some(Color::Red));
        assert_eq!(Color::from_name("DARKYELLOW"), Some(Color::DarkYellow));
        assert_eq!(Color::from_name(" Cyan "), Some(Color::Cyan));
    }

    #[test]
    fn test_color_from_name_accepts_grey_spelling() {
        assert_eq!(Color::from_name("grey"), Some(Color::Gray));
        assert_eq!(Color::from_name("DarkGrey"), Some(Color::DarkGray));
    }

    #[test]
    fn test_color_from_numeric_value() {
        assert_eq!(Color::from_name("0"), Some(Color::Black));
        assert_eq!(Color::from_name("12"), Some(Color::Red));
        assert_eq!(Color::from_name("16"), None);
    }

    #[test]
    fn test_color_unknown_name() {
        assert_eq!(Color::from_name("chartreuse"), None);
        assert_eq!(Color::from_name(""), None);
    }
}
