//! Character data: whitespace collapsing and word cells.
//!
//! Runs of whitespace collapse into one space, which is stored as the
//! trailing space of the word before it and allows a line break before the
//! word after it. Words separated only by markup stay glued together.

use quire_cells::{Cell, CellId, CellKind, ColorChange, ColorTarget, FontAttributes, FontId};
use quire_common::warning::warn_once;

use super::TreeBuilder;
use super::style::{SMALL_CAPS_PERCENT, small_caps_runs};

/// Whitespace that collapses. Other blanks, such as the no-break space, are
/// part of words.
const fn is_collapsible(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Where the text stream stands relative to the last emitted cell.
#[derive(Debug)]
pub(super) struct TextState {
    /// Characters of the word being accumulated.
    word: String,
    /// Word that a following space attaches to.
    last_word: Option<CellId>,
    /// The previous character was collapsible whitespace, or the line just
    /// started.
    last_was_space: bool,
    /// The next inline cell may start a new line.
    break_allowed: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            word: String::new(),
            last_word: None,
            last_was_space: true,
            break_allowed: true,
        }
    }
}

impl TextState {
    /// Entering or leaving a container: leading whitespace is dropped.
    pub(super) fn reset_line(&mut self) {
        self.last_word = None;
        self.last_was_space = true;
        self.break_allowed = true;
    }
}

impl TreeBuilder<'_> {
    pub(super) fn add_text(&mut self, text: &str) {
        if self.in_title {
            if let Some(title) = &mut self.title {
                title.push_str(text);
            }
            return;
        }
        if let Some(control) = &mut self.control {
            if let Some(label) = control.label_mut() {
                label.push_str(text);
            }
            return;
        }
        if self.in_head {
            return;
        }
        if self.in_grid() {
            if !text.chars().all(is_collapsible) {
                let _ = warn_once("builder", "ignoring text between table cells or list items");
            }
            return;
        }
        for ch in text.chars() {
            if is_collapsible(ch) {
                self.add_space();
            } else {
                self.text.word.push(ch);
            }
        }
    }

    /// Turn the accumulated characters into word cells.
    pub(super) fn emit_word(&mut self) {
        if self.text.word.is_empty() {
            return;
        }
        let word = std::mem::take(&mut self.text.word);
        let frame = self.fonts.current().clone();
        if frame.small_caps {
            let reduced = FontAttributes {
                size_percent: frame.size_percent * SMALL_CAPS_PERCENT / 100,
                ..frame.clone()
            };
            for (run, lower) in small_caps_runs(&word) {
                self.push_word(run, if lower { &reduced } else { &frame });
            }
        } else {
            self.push_word(word, &frame);
        }
    }

    fn push_word(&mut self, text: String, attrs: &FontAttributes) {
        let font = self.ctx.realize(attrs);
        let extent = self.ctx.measure(&text, font);
        if let Some(id) = self.push_inline(Cell::word(text, font, extent, 0), Some(font)) {
            self.text.last_word = Some(id);
        }
    }

    fn add_space(&mut self) {
        self.emit_word();
        if self.text.last_was_space {
            return;
        }
        self.text.last_was_space = true;
        self.text.break_allowed = true;
        let Some(id) = self.text.last_word else {
            return;
        };
        let Some(font) = self.tree[id].as_word().map(|word| word.font) else {
            return;
        };
        let space = self.ctx.measure(" ", font).width;
        let cell = &mut self.tree[id];
        if let CellKind::Word(word) = &mut cell.kind {
            word.space_after += space;
            cell.rect.width += space;
        }
    }

    /// Append a visible inline cell to the current container, preceded by
    /// the colour and font markers it needs. `font` is the font the cell is
    /// drawn with, if it draws text.
    pub(super) fn push_inline(&mut self, mut cell: Cell, font: Option<FontId>) -> Option<CellId> {
        if self.in_grid() {
            let _ = warn_once(
                "builder",
                &format!("ignoring {} between table cells or list items", cell.kind_name()),
            );
            return None;
        }
        self.sync_markers(font);
        let frame = self.fonts.current();
        cell.script = frame.script;
        cell.script_baseline = frame.script_baseline;
        cell.link = self.links.iter().rev().find_map(Clone::clone);
        cell.break_before = self.text.break_allowed;
        self.text.break_allowed = false;
        self.text.last_was_space = false;
        self.text.last_word = None;
        Some(self.tree.push(self.current, cell))
    }

    /// Append a zero-size marker cell.
    pub(super) fn push_marker(&mut self, kind: CellKind) -> Option<CellId> {
        if self.in_grid() {
            return None;
        }
        Some(self.tree.push(self.current, Cell::new(kind)))
    }

    /// Emit colour and font markers where the drawing state changes.
    fn sync_markers(&mut self, font: Option<FontId>) {
        let color = self.fonts.current().color;
        if color != self.emitted_color {
            self.emitted_color = color;
            let _ = self.push_marker(CellKind::Color(ColorChange {
                target: ColorTarget::Foreground,
                color,
            }));
        }
        if let Some(font) = font
            && self.emitted_font != Some(font)
        {
            self.emitted_font = Some(font);
            let _ = self.push_marker(CellKind::Font(font));
        }
    }

    /// `<br>` and `<pagebreak>`. The break is as tall as a line of the
    /// current font, so that an empty line keeps its height.
    pub(super) fn line_break(&mut self, page_break: bool) {
        let font = self.ctx.realize(self.fonts.current());
        let extent = self.ctx.measure(" ", font);
        let mut cell = Cell::sized(CellKind::LineBreak { page_break }, 0, extent.height);
        cell.descent = extent.descent;
        let _ = self.push_inline(cell, None);
        self.text.reset_line();
    }
}
