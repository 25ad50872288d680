//! Directive vocabulary and attribute coercion
//!
//! | Element  | Attributes                                           |
//! |----------|------------------------------------------------------|
//! | `color`  | `fg`, `bg`                                           |
//! | `cursor` | `x`, `y`, `dx`, `dy`, `size`, `show`                 |
//! | `window` | `x`, `y`, `width`, `height`, `bufwidth`, `bufheight`, `title` |
//! | `beep`   | `freq`, `duration`                                   |
//!
//! Any other element name is a transparent grouping node.

use std::time::Duration;

use crate::error::MarkupValueError;
use crate::parser::{Attribute, Element};
use crate::stylesheet::Stylesheet;
use crate::terminal::{Color, Position, Size, Terminal, Tone};
use crate::RenderError;

const TONE_FREQUENCIES: std::ops::RangeInclusive<i32> = 37..=32767;

/// The recognized directives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Color,
    Cursor,
    Window,
    Beep,
}

impl Directive {
    /// Element names are case-sensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "color" => Some(Directive::Color),
            "cursor" => Some(Directive::Cursor),
            "window" => Some(Directive::Window),
            "beep" => Some(Directive::Beep),
            _ => None,
        }
    }

    /// Apply this directive's side effects
    ///
    /// Returns whether the cursor position was set explicitly (`x`, `y`,
    /// `dx` or `dy` on a `cursor` element).
    pub fn apply<T: Terminal + ?Sized>(
        self,
        element: &Element,
        terminal: &mut T,
        stylesheet: &Stylesheet,
    ) -> Result<bool, RenderError> {
        let attrs = Attributes { element };
        match self {
            Directive::Color => apply_color(&attrs, terminal, stylesheet).map(|()| false),
            Directive::Cursor => apply_cursor(&attrs, terminal),
            Directive::Window => apply_window(&attrs, terminal).map(|()| false),
            Directive::Beep => apply_beep(&attrs, terminal).map(|()| false),
        }
    }
}

/// Typed access to an element's attributes
struct Attributes<'e> {
    element: &'e Element,
}

impl<'e> Attributes<'e> {
    fn get(&self, name: &str) -> Option<&'e Attribute> {
        self.element.attribute(name)
    }

    fn string(&self, name: &str) -> Option<&'e str> {
        self.get(name).map(Attribute::value)
    }

    fn integer(&self, name: &str) -> Result<Option<i32>, MarkupValueError> {
        self.get(name)
            .map(|attr| {
                attr.value().trim().parse::<i32>().map_err(|_| {
                    MarkupValueError::InvalidInteger {
                        element: self.element.name().to_string(),
                        attribute: name.to_string(),
                        value: attr.value().to_string(),
                        span: attr.value.span.clone(),
                    }
                })
            })
            .transpose()
    }

    fn boolean(&self, name: &str) -> Result<Option<bool>, MarkupValueError> {
        self.get(name)
            .map(|attr| {
                let value = attr.value().trim();
                if value.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if value.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(MarkupValueError::InvalidBoolean {
                        element: self.element.name().to_string(),
                        attribute: name.to_string(),
                        value: attr.value().to_string(),
                        span: attr.value.span.clone(),
                    })
                }
            })
            .transpose()
    }

    fn color(&self, name: &str, stylesheet: &Stylesheet) -> Result<Option<Color>, MarkupValueError> {
        self.get(name)
            .map(|attr| {
                stylesheet
                    .resolve_color(attr.value())
                    .ok_or_else(|| MarkupValueError::UnknownColor {
                        element: self.element.name().to_string(),
                        attribute: name.to_string(),
                        value: attr.value().to_string(),
                        span: attr.value.span.clone(),
                    })
            })
            .transpose()
    }

    fn out_of_range(&self, name: &str, value: impl ToString, reason: impl Into<String>) -> MarkupValueError {
        MarkupValueError::OutOfRange {
            element: self.element.name().to_string(),
            attribute: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
            span: self
                .get(name)
                .map(|a| a.value.span.clone())
                .unwrap_or_else(|| self.element.name.span.clone()),
        }
    }

    /// A coordinate that must fit `0..limit`
    fn within(&self, name: &str, value: i64, limit: u16) -> Result<u16, MarkupValueError> {
        if value < 0 || value >= i64::from(limit) {
            return Err(self.out_of_range(name, value, format!("must be within 0..{}", limit)));
        }
        Ok(value as u16)
    }

    /// A non-negative value that fits `u16`
    fn non_negative(&self, name: &str) -> Result<Option<u16>, MarkupValueError> {
        match self.integer(name)? {
            Some(v) => u16::try_from(v)
                .map(Some)
                .map_err(|_| self.out_of_range(name, v, format!("must be within 0..={}", u16::MAX))),
            None => Ok(None),
        }
    }

    /// A positive value that fits `u16`
    fn positive(&self, name: &str) -> Result<Option<u16>, MarkupValueError> {
        match self.integer(name)? {
            Some(v) => match u16::try_from(v) {
                Ok(v) if v > 0 => Ok(Some(v)),
                _ => Err(self.out_of_range(name, v, format!("must be within 1..={}", u16::MAX))),
            },
            None => Ok(None),
        }
    }
}

fn apply_color<T: Terminal + ?Sized>(
    attrs: &Attributes<'_>,
    terminal: &mut T,
    stylesheet: &Stylesheet,
) -> Result<(), RenderError> {
    if let Some(fg) = attrs.color("fg", stylesheet)? {
        terminal.set_foreground(Some(fg))?;
    }
    if let Some(bg) = attrs.color("bg", stylesheet)? {
        terminal.set_background(Some(bg))?;
    }
    Ok(())
}

fn apply_cursor<T: Terminal + ?Sized>(
    attrs: &Attributes<'_>,
    terminal: &mut T,
) -> Result<bool, RenderError> {
    // A relative offset is only read when no absolute value is given
    let x = attrs.integer("x")?;
    let dx = match x {
        Some(_) => None,
        None => attrs.integer("dx")?,
    };
    let y = attrs.integer("y")?;
    let dy = match y {
        Some(_) => None,
        None => attrs.integer("dy")?,
    };
    let mut moved = false;

    if x.is_some() || dx.is_some() || y.is_some() || dy.is_some() {
        let window = terminal.window_size()?;
        let buffer = terminal.buffer_size()?;
        let mut position = terminal.cursor_position()?;

        // Absolute wins over relative on each axis; negative absolute values
        // count back from the far edge of the window.
        let column = match (x, dx) {
            (Some(x), _) if x < 0 => Some(("x", i64::from(window.width) + i64::from(x))),
            (Some(x), _) => Some(("x", i64::from(x))),
            (None, Some(dx)) => Some(("dx", i64::from(position.column) + i64::from(dx))),
            (None, None) => None,
        };
        let row = match (y, dy) {
            (Some(y), _) if y < 0 => Some(("y", i64::from(window.height) + i64::from(y))),
            (Some(y), _) => Some(("y", i64::from(y))),
            (None, Some(dy)) => Some(("dy", i64::from(position.row) + i64::from(dy))),
            (None, None) => None,
        };

        if let Some((name, column)) = column {
            position.column = attrs.within(name, column, buffer.width)?;
        }
        if let Some((name, row)) = row {
            position.row = attrs.within(name, row, buffer.height)?;
        }
        terminal.set_cursor_position(position)?;
        moved = true;
    }

    if let Some(size) = attrs.integer("size")? {
        if !(1..=100).contains(&size) {
            return Err(attrs.out_of_range("size", size, "must be within 1..=100").into());
        }
        terminal.set_cursor_size(size as u8)?;
    }
    if let Some(show) = attrs.boolean("show")? {
        terminal.set_cursor_visible(show)?;
    }

    Ok(moved)
}

fn apply_window<T: Terminal + ?Sized>(
    attrs: &Attributes<'_>,
    terminal: &mut T,
) -> Result<(), RenderError> {
    let x = attrs.non_negative("x")?;
    let y = attrs.non_negative("y")?;
    if x.is_some() || y.is_some() {
        let current = terminal.window_position()?;
        terminal.set_window_position(Position::new(
            x.unwrap_or(current.column),
            y.unwrap_or(current.row),
        ))?;
    }

    let width = attrs.positive("width")?;
    let height = attrs.positive("height")?;
    if width.is_some() || height.is_some() {
        let current = terminal.window_size()?;
        terminal.set_window_size(Size::new(
            width.unwrap_or(current.width),
            height.unwrap_or(current.height),
        ))?;
    }

    let bufwidth = attrs.positive("bufwidth")?;
    let bufheight = attrs.positive("bufheight")?;
    if bufwidth.is_some() || bufheight.is_some() {
        let current = terminal.buffer_size()?;
        terminal.set_buffer_size(Size::new(
            bufwidth.unwrap_or(current.width),
            bufheight.unwrap_or(current.height),
        ))?;
    }

    if let Some(title) = attrs.string("title") {
        terminal.set_title(title)?;
    }
    Ok(())
}

fn apply_beep<T: Terminal + ?Sized>(
    attrs: &Attributes<'_>,
    terminal: &mut T,
) -> Result<(), RenderError> {
    match (attrs.integer("freq")?, attrs.integer("duration")?) {
        (Some(freq), Some(duration)) => {
            if !TONE_FREQUENCIES.contains(&freq) {
                return Err(attrs
                    .out_of_range("freq", freq, "must be within 37..=32767 Hz")
                    .into());
            }
            if duration <= 0 {
                return Err(attrs
                    .out_of_range("duration", duration, "must be a positive number of milliseconds")
                    .into());
            }
            terminal.tone(Tone {
                frequency: freq as u32,
                duration: Duration::from_millis(duration as u64),
            })?;
        }
        _ => terminal.beep()?,
    }
    Ok(())
}
