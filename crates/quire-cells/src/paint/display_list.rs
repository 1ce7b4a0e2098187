//! A recording surface.
//!
//! Painting into a [`DisplayList`] captures the drawing commands in painting
//! order so they can be replayed onto a real surface later, inspected in
//! tests or serialized.

use serde::Serialize;

use super::Surface;
use crate::cell::{WidgetCell, WidgetKind};
use crate::font::FontSpec;
use crate::geometry::{Color, Rect};

/// A single drawing command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DisplayCommand {
    /// Fill a rectangle with a solid colour.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Fill colour.
        color: Color,
    },
    /// Draw a one pixel line.
    DrawLine {
        /// Start x.
        x1: i32,
        /// Start y.
        y1: i32,
        /// End x.
        x2: i32,
        /// End y.
        y2: i32,
        /// Line colour.
        color: Color,
    },
    /// Draw text with its box's top-left corner at `(x, y)`.
    DrawText {
        /// Left edge.
        x: i32,
        /// Top edge.
        y: i32,
        /// The text.
        text: String,
        /// Font to draw with.
        font: FontSpec,
        /// Text colour.
        color: Color,
    },
    /// Draw an image scaled to `rect`.
    DrawImage {
        /// Target area.
        rect: Rect,
        /// Source location, used to look up decoded pixels.
        src: String,
    },
    /// Draw a form control.
    DrawWidget {
        /// Target area.
        rect: Rect,
        /// Kind of control.
        kind: WidgetKind,
        /// Label.
        label: String,
        /// Checked state of radio buttons.
        checked: bool,
    },
}

/// Drawing commands in painting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    commands: Vec<DisplayCommand>,
}

impl DisplayList {
    /// Create an empty display list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Add a command.
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// The commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[DisplayCommand] {
        &self.commands
    }

    /// Number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the display list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The text of every text command, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DisplayCommand::DrawText { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Replay every command onto another surface.
    pub fn replay(&self, surface: &mut dyn Surface) {
        for command in &self.commands {
            match command {
                DisplayCommand::FillRect { rect, color } => surface.fill_rect(*rect, *color),
                DisplayCommand::DrawLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                } => surface.draw_line(*x1, *y1, *x2, *y2, *color),
                DisplayCommand::DrawText {
                    x,
                    y,
                    text,
                    font,
                    color,
                } => surface.draw_text(*x, *y, text, font, *color),
                DisplayCommand::DrawImage { rect, src } => surface.draw_image(*rect, src),
                DisplayCommand::DrawWidget {
                    rect,
                    kind,
                    label,
                    checked,
                } => {
                    surface.draw_widget(
                        *rect,
                        &WidgetCell {
                            form: 0,
                            element: 0,
                            option: 0,
                            kind: *kind,
                            label: label.clone(),
                            checked: *checked,
                        },
                        None,
                    );
                }
            }
        }
    }
}

impl Surface for DisplayList {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DisplayCommand::FillRect { rect, color });
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        self.push(DisplayCommand::DrawLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, font: &FontSpec, color: Color) {
        self.push(DisplayCommand::DrawText {
            x,
            y,
            text: text.to_string(),
            font: font.clone(),
            color,
        });
    }

    fn draw_image(&mut self, rect: Rect, src: &str) {
        self.push(DisplayCommand::DrawImage {
            rect,
            src: src.to_string(),
        });
    }

    fn draw_widget(&mut self, rect: Rect, widget: &WidgetCell, _font: Option<&FontSpec>) {
        self.push(DisplayCommand::DrawWidget {
            rect,
            kind: widget.kind,
            label: widget.label.clone(),
            checked: widget.checked,
        });
    }
}
