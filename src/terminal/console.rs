//! Real terminal on stdout, driven through crossterm

use std::io::{self, BufRead, IsTerminal, Stdout, Write};

use crossterm::cursor::{self, SetCursorStyle};
use crossterm::style::{self, SetBackgroundColor, SetForegroundColor};
use crossterm::{queue, terminal};
use tracing::trace;

use super::{Color, Position, Size, Terminal, Tone};

/// Fallback geometry when the device cannot be queried
const FALLBACK_SIZE: Size = Size {
    width: 80,
    height: 25,
};

/// Stdout-backed [`Terminal`]
///
/// ANSI terminals cannot report colors, title, cursor size or visibility,
/// and have no notion of a window position or a buffer distinct from the
/// window. Those properties are kept as shadow state so the getters stay
/// consistent with what was last set. When stdout is not a TTY only text is
/// written and every other setter just updates the shadow state.
pub struct ConsoleTerminal {
    out: Stdout,
    tty: bool,
    linux_console: bool,
    foreground: Option<Color>,
    background: Option<Color>,
    cursor: Position,
    cursor_size: u8,
    cursor_visible: bool,
    window_position: Position,
    window_size: Option<Size>,
    buffer_size: Option<Size>,
    title: String,
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleTerminal {
    pub fn new() -> Self {
        let out = io::stdout();
        let tty = out.is_terminal();
        Self {
            out,
            tty,
            linux_console: std::env::var("TERM").is_ok_and(|term| term == "linux"),
            foreground: None,
            background: None,
            cursor: Position::default(),
            cursor_size: 25,
            cursor_visible: true,
            window_position: Position::default(),
            window_size: None,
            buffer_size: None,
            title: String::new(),
        }
    }

    /// Whether escape sequences are being emitted
    pub fn is_tty(&self) -> bool {
        self.tty
    }

    fn track_text(&mut self, text: &str) {
        let width = self.buffer_size.or(self.window_size).unwrap_or(FALLBACK_SIZE).width;
        for ch in text.chars() {
            match ch {
                '\n' => {
                    self.cursor.column = 0;
                    self.cursor.row = self.cursor.row.saturating_add(1);
                }
                '\r' => self.cursor.column = 0,
                _ => {
                    self.cursor.column += 1;
                    if self.cursor.column >= width {
                        self.cursor.column = 0;
                        self.cursor.row = self.cursor.row.saturating_add(1);
                    }
                }
            }
        }
    }
}

fn to_crossterm(color: Option<Color>) -> style::Color {
    match color {
        None => style::Color::Reset,
        Some(Color::Black) => style::Color::Black,
        Some(Color::DarkBlue) => style::Color::DarkBlue,
        Some(Color::DarkGreen) => style::Color::DarkGreen,
        Some(Color::DarkCyan) => style::Color::DarkCyan,
        Some(Color::DarkRed) => style::Color::DarkRed,
        Some(Color::DarkMagenta) => style::Color::DarkMagenta,
        Some(Color::DarkYellow) => style::Color::DarkYellow,
        Some(Color::Gray) => style::Color::Grey,
        Some(Color::DarkGray) => style::Color::DarkGrey,
        Some(Color::Blue) => style::Color::Blue,
        Some(Color::Green) => style::Color::Green,
        Some(Color::Cyan) => style::Color::Cyan,
        Some(Color::Red) => style::Color::Red,
        Some(Color::Magenta) => style::Color::Magenta,
        Some(Color::Yellow) => style::Color::Yellow,
        Some(Color::White) => style::Color::White,
    }
}

/// Bytes that sound `tone`
///
/// Only the Linux virtual console understands the bell pitch/duration
/// sequences; elsewhere the tone degrades to a plain BEL.
fn tone_sequence(tone: Tone, linux_console: bool) -> String {
    if linux_console {
        format!(
            "\x1b[10;{}]\x1b[11;{}]\x07\x1b[10]\x1b[11]",
            tone.frequency,
            tone.duration.as_millis()
        )
    } else {
        "\x07".to_string()
    }
}

/// Map a cursor height percentage onto the closest ANSI cursor shape
fn cursor_style(size: u8) -> SetCursorStyle {
    if size >= 50 {
        SetCursorStyle::SteadyBlock
    } else {
        SetCursorStyle::SteadyUnderScore
    }
}

impl Terminal for ConsoleTerminal {
    fn foreground(&mut self) -> io::Result<Option<Color>> {
        Ok(self.foreground)
    }

    fn set_foreground(&mut self, color: Option<Color>) -> io::Result<()> {
        if self.tty {
            queue!(self.out, SetForegroundColor(to_crossterm(color)))?;
        }
        self.foreground = color;
        Ok(())
    }

    fn background(&mut self) -> io::Result<Option<Color>> {
        Ok(self.background)
    }

    fn set_background(&mut self, color: Option<Color>) -> io::Result<()> {
        if self.tty {
            queue!(self.out, SetBackgroundColor(to_crossterm(color)))?;
        }
        self.background = color;
        Ok(())
    }

    fn cursor_position(&mut self) -> io::Result<Position> {
        if self.tty {
            self.out.flush()?;
            match cursor::position() {
                Ok((column, row)) => {
                    self.cursor = Position::new(column, row);
                }
                Err(err) => trace!(%err, "cursor position query failed, using tracked position"),
            }
        }
        Ok(self.cursor)
    }

    fn set_cursor_position(&mut self, position: Position) -> io::Result<()> {
        if self.tty {
            queue!(self.out, cursor::MoveTo(position.column, position.row))?;
        }
        self.cursor = position;
        Ok(())
    }

    fn cursor_size(&mut self) -> io::Result<u8> {
        Ok(self.cursor_size)
    }

    fn set_cursor_size(&mut self, size: u8) -> io::Result<()> {
        if self.tty {
            queue!(self.out, cursor_style(size))?;
        }
        self.cursor_size = size;
        Ok(())
    }

    fn cursor_visible(&mut self) -> io::Result<bool> {
        Ok(self.cursor_visible)
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        if self.tty {
            if visible {
                queue!(self.out, cursor::Show)?;
            } else {
                queue!(self.out, cursor::Hide)?;
            }
        }
        self.cursor_visible = visible;
        Ok(())
    }

    fn window_position(&mut self) -> io::Result<Position> {
        Ok(self.window_position)
    }

    fn set_window_position(&mut self, position: Position) -> io::Result<()> {
        trace!(?position, "window position is not supported, tracking only");
        self.window_position = position;
        Ok(())
    }

    fn window_size(&mut self) -> io::Result<Size> {
        if self.tty {
            if let Ok((width, height)) = terminal::size() {
                return Ok(Size::new(width, height));
            }
        }
        Ok(self.window_size.unwrap_or(FALLBACK_SIZE))
    }

    fn set_window_size(&mut self, size: Size) -> io::Result<()> {
        if self.tty {
            queue!(self.out, terminal::SetSize(size.width, size.height))?;
        }
        self.window_size = Some(size);
        Ok(())
    }

    fn buffer_size(&mut self) -> io::Result<Size> {
        match self.buffer_size {
            Some(size) => Ok(size),
            None => self.window_size(),
        }
    }

    fn set_buffer_size(&mut self, size: Size) -> io::Result<()> {
        trace!(?size, "buffer size is not supported, tracking only");
        self.buffer_size = Some(size);
        Ok(())
    }

    fn title(&mut self) -> io::Result<String> {
        Ok(self.title.clone())
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        if self.tty {
            queue!(self.out, terminal::SetTitle(title))?;
        }
        self.title = title.to_string();
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.track_text(text);
        Ok(())
    }

    fn beep(&mut self) -> io::Result<()> {
        if self.tty {
            self.out.write_all(b"\x07")?;
        }
        Ok(())
    }

    fn tone(&mut self, tone: Tone) -> io::Result<()> {
        if self.tty {
            self.out
                .write_all(tone_sequence(tone, self.linux_console).as_bytes())?;
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.out.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        self.cursor = Position::new(0, self.cursor.row.saturating_add(1));
        Ok(Some(line))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tone() -> Tone {
        Tone {
            frequency: 440,
            duration: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_tone_on_linux_console_sets_bell_parameters() {
        assert_eq!(
            tone_sequence(tone(), true),
            "\x1b[10;440]\x1b[11;200]\x07\x1b[10]\x1b[11]"
        );
    }

    #[test]
    fn test_tone_elsewhere_is_plain_bell() {
        assert_eq!(tone_sequence(tone(), false), "\x07");
    }

    #[test]
    fn test_cursor_style_thresholds() {
        assert!(matches!(cursor_style(100), SetCursorStyle::SteadyBlock));
        assert!(matches!(cursor_style(25), SetCursorStyle::SteadyUnderScore));
    }
}
