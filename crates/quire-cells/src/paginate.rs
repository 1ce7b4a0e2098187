//! Splitting a laid-out tree into pages.

use crate::cell::{CellId, CellKind};
use crate::tree::CellTree;

impl CellTree {
    /// Move `pagebreak` up so that it does not cut through any cell below
    /// `id` that cannot be split. `origin_y` is the absolute y of the parent
    /// of `id`.
    #[must_use]
    pub fn adjust_pagebreak(&self, id: CellId, origin_y: i32, pagebreak: i32) -> i32 {
        let Some(cell) = self.get(id) else {
            return pagebreak;
        };
        let top = origin_y + cell.rect.y;
        if top >= pagebreak {
            return pagebreak;
        }
        if !cell.can_split {
            return if cell.rect.height > 0 && top + cell.rect.height > pagebreak {
                top
            } else {
                pagebreak
            };
        }
        self.children(id)
            .fold(pagebreak, |pb, child| self.adjust_pagebreak(child, top, pb))
    }

    /// Bottom edges of the pages needed to print `root` on pages of
    /// `page_height` pixels. The last entry is the document height.
    ///
    /// Page-break cells end a page early. A cell taller than a whole page is
    /// cut where the page ends.
    #[must_use]
    pub fn page_breaks(&self, root: CellId, page_height: i32) -> Vec<i32> {
        let Some(cell) = self.get(root) else {
            return Vec::new();
        };
        let parent_y = self.parent(root).map_or(0, |p| self.absolute_position(p).1);
        let total = parent_y + cell.rect.bottom();
        let mut forced: Vec<i32> = self
            .terminals(root)
            .filter(|&t| matches!(self[t].kind, CellKind::LineBreak { page_break: true }))
            .map(|t| {
                let (_, y) = self.absolute_position(t);
                y + self[t].rect.height
            })
            .collect();
        forced.sort_unstable();

        let mut breaks = Vec::new();
        if page_height <= 0 {
            breaks.push(total);
            return breaks;
        }
        let mut position = 0;
        while position < total {
            let mut pagebreak = position + page_height;
            if let Some(&early) = forced.iter().find(|&&f| f > position && f < pagebreak) {
                pagebreak = early;
            }
            if pagebreak >= total {
                breaks.push(total);
                break;
            }
            let adjusted = self.adjust_pagebreak(root, parent_y, pagebreak);
            if adjusted > position {
                pagebreak = adjusted;
            }
            breaks.push(pagebreak);
            position = pagebreak;
        }
        breaks
    }
}
