//! Searching and walking the cell tree.

use crate::cell::{Cell, CellId, CellKind, LinkInfo};
use crate::geometry::Rect;
use crate::tree::CellTree;

/// What [`CellTree::find`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindCondition<'a> {
    /// A named anchor.
    Anchor(&'a str),
    /// A cell linking to this target.
    Link(&'a str),
    /// The widget of a form element.
    Widget {
        /// Form index.
        form: usize,
        /// Element index within the form.
        element: usize,
    },
}

impl FindCondition<'_> {
    fn matches(&self, cell: &Cell) -> bool {
        match (self, &cell.kind) {
            (Self::Anchor(name), CellKind::Anchor(anchor)) => anchor == name,
            (Self::Link(href), _) => cell.link.as_ref().is_some_and(|l| l.href == *href),
            (Self::Widget { form, element }, CellKind::Widget(widget)) => {
                widget.form == *form && widget.element == *element
            }
            _ => false,
        }
    }
}

/// How [`CellTree::find_cell_by_pos`] treats points between cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionMode {
    /// Only a cell containing the point.
    #[default]
    Exact,
    /// The last cell before the point in reading order.
    NearestBefore,
    /// The first cell after the point in reading order.
    NearestAfter,
}

impl CellTree {
    /// The first cell below `id` (inclusive, depth first) matching
    /// `condition`.
    #[must_use]
    pub fn find(&self, id: CellId, condition: FindCondition<'_>) -> Option<CellId> {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let cell = self.get(current)?;
            if condition.matches(cell) {
                return Some(current);
            }
            let first = pending.len();
            pending.extend(self.children(current));
            pending[first..].reverse();
        }
        None
    }

    /// The first terminal cell at or below `id`.
    #[must_use]
    pub fn first_terminal(&self, id: CellId) -> Option<CellId> {
        let cell = self.get(id)?;
        if cell.is_terminal() {
            return Some(id);
        }
        self.children(id).find_map(|child| self.first_terminal(child))
    }

    /// The terminal cell following `id` in reading order.
    #[must_use]
    pub fn next_terminal(&self, id: CellId) -> Option<CellId> {
        let mut current = id;
        loop {
            if let Some(next) = self.next_sibling(current) {
                if let Some(terminal) = self.first_terminal(next) {
                    return Some(terminal);
                }
                current = next;
            } else {
                current = self.parent(current)?;
            }
        }
    }

    /// Iterate over the terminal cells below `id` in reading order.
    #[must_use]
    pub fn terminals(&self, id: CellId) -> Terminals<'_> {
        Terminals {
            tree: self,
            root: id,
            next: self.first_terminal(id),
        }
    }

    /// Locate the visible terminal cell at `(x, y)`, in coordinates relative
    /// to `id`.
    #[must_use]
    pub fn find_cell_by_pos(&self, id: CellId, x: i32, y: i32, mode: PositionMode) -> Option<CellId> {
        match mode {
            PositionMode::Exact => self.cell_at(id, x, y),
            PositionMode::NearestBefore | PositionMode::NearestAfter => {
                let (ox, oy) = self.absolute_position(id);
                let (x, y) = (x + ox, y + oy);
                let mut visible = self
                    .terminals(id)
                    .filter(|&t| !self[t].is_formatting())
                    .map(|t| {
                        let (ax, ay) = self.absolute_position(t);
                        let size = self[t].rect;
                        (t, Rect::new(ax, ay, size.width, size.height))
                    });
                if mode == PositionMode::NearestBefore {
                    visible
                        .filter(|(_, r)| r.bottom() <= y || (r.y <= y && r.x <= x))
                        .last()
                        .map(|(t, _)| t)
                } else {
                    visible
                        .find(|(_, r)| r.y > y || (r.bottom() > y && r.right() > x))
                        .map(|(t, _)| t)
                }
            }
        }
    }

    fn cell_at(&self, id: CellId, x: i32, y: i32) -> Option<CellId> {
        for child in self.children(id) {
            let cell = &self[child];
            if cell.is_formatting() || !cell.rect.contains(x, y) {
                continue;
            }
            if cell.is_terminal() {
                return Some(child);
            }
            if let Some(found) = self.cell_at(child, x - cell.rect.x, y - cell.rect.y) {
                return Some(found);
            }
        }
        None
    }

    /// The link under `(x, y)`, in coordinates relative to `id`.
    #[must_use]
    pub fn link_at(&self, id: CellId, x: i32, y: i32) -> Option<&LinkInfo> {
        let cell = self.find_cell_by_pos(id, x, y, PositionMode::Exact)?;
        self[cell].link.as_ref()
    }
}

/// Iterator over terminal cells in reading order.
#[derive(Debug, Clone)]
pub struct Terminals<'a> {
    tree: &'a CellTree,
    root: CellId,
    next: Option<CellId>,
}

impl Iterator for Terminals<'_> {
    type Item = CellId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self
            .tree
            .next_terminal(current)
            .filter(|&t| t == self.root || self.tree.is_descendant_of(t, self.root));
        Some(current)
    }
}
