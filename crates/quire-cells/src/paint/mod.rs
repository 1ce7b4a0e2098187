//! Painting the cell tree onto a [`Surface`].
//!
//! Painting walks the tree in reading order. Colour and font markers change
//! the [`RenderingInfo`] for everything drawn after them, so cells outside
//! the visible band are still walked with [`CellTree::draw_invisible`] to
//! keep that state right.

pub mod display_list;

pub use display_list::{DisplayCommand, DisplayList};

use std::ops::Range;

use crate::cell::{Cell, CellId, CellKind, ColorTarget, WidgetCell, WidgetKind, WordCell};
use crate::config::RenderConfig;
use crate::container::{Border, ContainerData};
use crate::context::RenderContext;
use crate::font::{FontId, FontSpec};
use crate::geometry::{Color, Rect};
use crate::select::{Selection, char_slice};
use crate::tree::CellTree;

/// A target for drawing commands.
pub trait Surface {
    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a one pixel line between two points.
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color);

    /// Draw `text` with the top-left corner of its box at `(x, y)`.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, font: &FontSpec, color: Color);

    /// Draw the image at `src` scaled to `rect`.
    fn draw_image(&mut self, rect: Rect, src: &str);

    /// Draw a form control. The default draws a framed box with its label.
    fn draw_widget(&mut self, rect: Rect, widget: &WidgetCell, font: Option<&FontSpec>) {
        self.fill_rect(rect, Color::WHITE);
        draw_border(self, rect, Border::sunken(1));
        if widget.kind == WidgetKind::RadioBox && widget.checked {
            let dot = (rect.height / 2).max(1);
            let inset = (rect.height - dot) / 2;
            self.fill_rect(
                Rect::new(rect.x + inset, rect.y + inset, dot, dot),
                Color::BLACK,
            );
        }
        if let Some(font) = font {
            let offset = if widget.kind == WidgetKind::RadioBox {
                rect.height + 2
            } else {
                3
            };
            self.draw_text(rect.x + offset, rect.y + 1, &widget.label, font, Color::BLACK);
        }
    }
}

/// Drawing state carried from cell to cell in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderingInfo {
    /// Current text colour.
    pub foreground: Color,
    /// Current text background, if any.
    pub background: Option<Color>,
    /// Current font, once a font marker has been seen.
    pub font: Option<FontId>,
    /// Active selection.
    pub selection: Option<Selection>,
    /// Text colour of selected text.
    pub selection_foreground: Color,
    /// Background of selected text.
    pub selection_background: Color,
    selecting: bool,
}

impl RenderingInfo {
    /// Initial state for painting with `config`.
    #[must_use]
    pub const fn new(config: &RenderConfig) -> Self {
        Self {
            foreground: config.text_color,
            background: None,
            font: None,
            selection: None,
            selection_foreground: config.selection_foreground,
            selection_background: config.selection_background,
            selecting: false,
        }
    }

    /// Highlight `selection` while painting.
    #[must_use]
    pub const fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Whether the walk is currently inside the selection.
    #[must_use]
    pub const fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Apply the side effects of a terminal cell: colour and font markers,
    /// and entering or leaving the selection. Returns the selected character
    /// range of the cell, if any of it is selected.
    fn visit(&mut self, id: CellId, cell: &Cell) -> Option<(Option<usize>, Option<usize>)> {
        match &cell.kind {
            CellKind::Color(change) => match change.target {
                ColorTarget::Foreground => self.foreground = change.color,
                ColorTarget::Background => self.background = Some(change.color),
            },
            CellKind::Font(font) => self.font = Some(*font),
            _ => {}
        }
        let selection = self.selection?;
        if selection.from.cell == id {
            self.selecting = true;
        }
        let range = self.selecting.then(|| selection.range_in(id));
        if selection.to.cell == id {
            self.selecting = false;
        }
        range
    }
}

impl CellTree {
    /// Paint `id` and its subtree. `origin` is the absolute position of the
    /// parent's top-left corner; only cells intersecting the vertical band
    /// `view` are drawn, the rest are walked invisibly.
    pub fn draw(
        &self,
        id: CellId,
        ctx: &RenderContext,
        surface: &mut dyn Surface,
        origin: (i32, i32),
        view: &Range<i32>,
        info: &mut RenderingInfo,
    ) {
        let Some(cell) = self.get(id) else {
            return;
        };
        let rect = cell.rect.translate(origin.0, origin.1);
        if !cell.is_formatting() && (rect.bottom() <= view.start || rect.y >= view.end) {
            self.draw_invisible(id, info);
            return;
        }
        if let CellKind::Container(data) = &cell.kind {
            paint_container(surface, rect, data);
            for child in self.children(id) {
                self.draw(child, ctx, surface, (rect.x, rect.y), view, info);
            }
            return;
        }

        let selected = info.visit(id, cell);
        match &cell.kind {
            CellKind::Word(word) => paint_word(surface, ctx, cell, word, rect, info, selected),
            CellKind::Image(image) if image.broken => {
                surface.fill_rect(rect, Color::LIGHT_GREY);
                draw_border(surface, rect, Border::sunken(1));
            }
            CellKind::Image(image) => surface.draw_image(rect, &image.src),
            CellKind::Rule(rule) if rule.solid => {
                surface.fill_rect(rect, Color::DARK_GREY);
            }
            CellKind::Rule(_) => {
                let mid = rect.y + rect.height / 2;
                surface.draw_line(rect.x, mid, rect.right() - 1, mid, Color::DARK_GREY);
                surface.draw_line(rect.x, mid + 1, rect.right() - 1, mid + 1, Color::LIGHT_GREY);
            }
            CellKind::Widget(widget) => {
                let font = info.font.and_then(|f| ctx.font(f));
                surface.draw_widget(rect, widget, font);
            }
            _ => {}
        }
    }

    /// Walk `id` and its subtree without drawing, applying colour, font and
    /// selection state changes to `info`.
    pub fn draw_invisible(&self, id: CellId, info: &mut RenderingInfo) {
        let Some(cell) = self.get(id) else {
            return;
        };
        if cell.is_terminal() {
            let _ = info.visit(id, cell);
            return;
        }
        for child in self.children(id) {
            self.draw_invisible(child, info);
        }
    }
}

fn paint_container(surface: &mut dyn Surface, rect: Rect, data: &ContainerData) {
    if let Some(background) = data.background {
        surface.fill_rect(rect, background);
    }
    if let Some(border) = data.border {
        draw_border(surface, rect, border);
    }
}

fn draw_border<S: Surface + ?Sized>(surface: &mut S, rect: Rect, border: Border) {
    let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
    for i in 0..border.width {
        surface.draw_line(rect.x + i, rect.y + i, right - i, rect.y + i, border.light);
        surface.draw_line(rect.x + i, rect.y + i, rect.x + i, bottom - i, border.light);
        surface.draw_line(rect.x + i, bottom - i, right - i, bottom - i, border.dark);
        surface.draw_line(right - i, rect.y + i, right - i, bottom - i, border.dark);
    }
}

fn paint_word(
    surface: &mut dyn Surface,
    ctx: &RenderContext,
    cell: &Cell,
    word: &WordCell,
    rect: Rect,
    info: &RenderingInfo,
    selected: Option<(Option<usize>, Option<usize>)>,
) {
    let Some(font) = ctx.font(word.font) else {
        return;
    };
    if let Some(background) = info.background {
        surface.fill_rect(rect, background);
    }

    match selected {
        None => surface.draw_text(rect.x, rect.y, &word.text, font, info.foreground),
        Some((start, end)) => {
            // Unselected head, highlighted middle, unselected tail.
            let head = start.map_or("", |s| char_slice(&word.text, None, Some(s)));
            let middle = char_slice(&word.text, start, end);
            let tail = end.map_or("", |e| char_slice(&word.text, Some(e), None));
            let mut x = rect.x;
            if !head.is_empty() {
                surface.draw_text(x, rect.y, head, font, info.foreground);
                x += ctx.measurer.measure(head, font).width;
            }
            let mut width = ctx.measurer.measure(middle, font).width;
            if end.is_none() {
                width += word.space_after;
            }
            surface.fill_rect(
                Rect::new(x, rect.y, width, rect.height),
                info.selection_background,
            );
            surface.draw_text(x, rect.y, middle, font, info.selection_foreground);
            x += ctx.measurer.measure(middle, font).width;
            if !tail.is_empty() {
                surface.draw_text(x, rect.y, tail, font, info.foreground);
            }
        }
    }

    if font.underline {
        let baseline = rect.bottom() - cell.descent + 1;
        let end = rect.right() - word.space_after;
        surface.draw_line(rect.x, baseline, end - 1, baseline, info.foreground);
    }
}
