//! Text selection: ranges of terminal cells and the text they cover.

use crate::cell::{CellId, CellKind};
use crate::tree::CellTree;

/// One end of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPoint {
    /// Terminal cell.
    pub cell: CellId,
    /// Character offset inside a word; `None` means the whole cell.
    pub offset: Option<usize>,
}

impl SelectionPoint {
    /// The whole of `cell`.
    #[must_use]
    pub const fn cell(cell: CellId) -> Self {
        Self { cell, offset: None }
    }

    /// A character offset inside `cell`.
    #[must_use]
    pub const fn at(cell: CellId, offset: usize) -> Self {
        Self {
            cell,
            offset: Some(offset),
        }
    }
}

/// A range of terminal cells in reading order, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// First selected cell.
    pub from: SelectionPoint,
    /// Last selected cell.
    pub to: SelectionPoint,
}

impl Selection {
    /// Select from `from` to `to`.
    #[must_use]
    pub const fn new(from: SelectionPoint, to: SelectionPoint) -> Self {
        Self { from, to }
    }

    /// Character range selected within `cell`, given that `cell` lies inside
    /// the selection. `None` bounds are open.
    #[must_use]
    pub fn range_in(&self, cell: CellId) -> (Option<usize>, Option<usize>) {
        let start = if cell == self.from.cell {
            self.from.offset
        } else {
            None
        };
        let end = if cell == self.to.cell {
            self.to.offset
        } else {
            None
        };
        (start, end)
    }
}

/// Byte index of the `chars`-th character of `text`, clamped to its end.
#[must_use]
pub fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

/// Slice `text` by character offsets.
#[must_use]
pub fn char_slice(text: &str, start: Option<usize>, end: Option<usize>) -> &str {
    let from = start.map_or(0, |s| char_to_byte(text, s));
    let to = end.map_or(text.len(), |e| char_to_byte(text, e)).max(from);
    &text[from..to]
}

impl CellTree {
    /// Plain text covered by `selection`.
    ///
    /// Words are joined by single spaces where the source had whitespace.
    /// Line breaks and boundaries between containers become newlines.
    #[must_use]
    pub fn selection_text(&self, selection: &Selection) -> String {
        let mut text = String::new();
        let mut previous_parent = None;
        let mut cell_id = Some(selection.from.cell);
        while let Some(id) = cell_id {
            let Some(cell) = self.get(id) else {
                break;
            };
            if cell.parent != previous_parent && !cell.is_formatting() {
                if previous_parent.is_some() && !text.is_empty() {
                    end_line(&mut text);
                }
                previous_parent = cell.parent;
            }
            match &cell.kind {
                CellKind::Word(word) => {
                    let (start, end) = selection.range_in(id);
                    text.push_str(char_slice(&word.text, start, end));
                    if word.space_after > 0 && id != selection.to.cell {
                        text.push(' ');
                    }
                }
                CellKind::LineBreak { .. } => end_line(&mut text),
                CellKind::Image(image) if !image.alt.is_empty() => text.push_str(&image.alt),
                _ => {}
            }
            if id == selection.to.cell {
                break;
            }
            cell_id = self.next_terminal(id);
        }
        text.truncate(text.trim_end().len());
        text
    }

    /// Plain text of everything below `id`.
    #[must_use]
    pub fn document_text(&self, id: CellId) -> String {
        let mut terminals = self.terminals(id);
        let Some(first) = terminals.next() else {
            return String::new();
        };
        let last = terminals.last().unwrap_or(first);
        self.selection_text(&Selection::new(
            SelectionPoint::cell(first),
            SelectionPoint::cell(last),
        ))
    }
}

/// Replace trailing spaces with a single newline.
fn end_line(text: &mut String) {
    text.truncate(text.trim_end_matches(' ').len());
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_slice() {
        assert_eq!(char_slice("héllo", Some(1), Some(3)), "él");
        assert_eq!(char_slice("héllo", None, Some(2)), "hé");
        assert_eq!(char_slice("héllo", Some(4), None), "o");
        assert_eq!(char_slice("hi", Some(5), None), "");
    }
}
