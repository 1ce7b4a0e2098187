//! Inline flow: breaking a container's children into lines.
//!
//! Children are placed left to right. A line is broken before a child that
//! allows it when the child would cross the right indent; the first child
//! of a line is always placed, however wide. Zero-size formatting markers
//! never affect breaking or measurement.

use super::{Frame, NARROW_WIDTH, layout_cell};
use crate::cell::{Cell, CellId};
use crate::geometry::{HAlign, Length, VAlign};
use crate::tree::CellTree;

pub(super) fn layout_block(tree: &mut CellTree, id: CellId, available: i32) {
    let Some(data) = tree.container(id) else {
        return;
    };
    let frame = Frame::resolve(data, available);
    let align = data.align_h;
    let nowrap = data.nowrap;
    let text_indent = data.text_indent;
    let declared = match data.width {
        Length::Pixels(px) if px > 0 => px,
        _ => 0,
    };
    let min_height = data.min_height;
    let align_v = data.align_v;
    let children: Vec<CellId> = tree.children(id).collect();

    // STEP 1: Lay out the children at the content width.
    let child_width = frame.inner.max(NARROW_WIDTH);
    for &child in &children {
        layout_cell(tree, child, child_width);
    }

    // STEP 2: Break into lines, tracking the widest unbroken run.
    let mut lines = LineBreaker::new(frame, align, text_indent);
    let mut run = 0;
    let mut widest_run = 0;
    for &child in &children {
        let cell = &tree[child];
        if cell.is_formatting() {
            lines.push(tree, child);
            continue;
        }
        if cell.is_terminal() {
            run += cell.rect.width;
        } else {
            widest_run = widest_run.max(run);
            run = 0;
            let nested = tree.container(child).map_or(0, |d| d.max_total_width);
            widest_run = widest_run.max(nested);
        }
        let forces_break = cell.forces_break();
        if !nowrap && cell.break_before && lines.has_content && !lines.fits(cell) {
            lines.finish(tree, false);
        }
        lines.push(tree, child);
        if forces_break {
            lines.finish(tree, true);
            widest_run = widest_run.max(run);
            run = 0;
        }
    }
    lines.finish(tree, true);
    widest_run = widest_run.max(run);

    // STEP 3: Size the container and honour its minimum height.
    let mut height = lines.y + frame.bottom;
    if min_height > height {
        let pad = min_height - height;
        let dy = match align_v {
            VAlign::Top => 0,
            VAlign::Center => pad / 2,
            VAlign::Bottom => pad,
        };
        if dy != 0 {
            for &child in &children {
                tree[child].rect.y += dy;
            }
        }
        height = min_height;
    }
    let max_line_width = lines.widest + frame.right;
    let cell = &mut tree[id];
    cell.rect.width = frame.width.max(max_line_width);
    cell.rect.height = height;
    if let Some(data) = cell.as_container_mut() {
        data.max_line_width = max_line_width;
        data.max_total_width = (widest_run + frame.left + frame.right).max(declared);
    }
}

/// Accumulates the cells of the current line and positions them when the
/// line is finished.
struct LineBreaker {
    frame: Frame,
    align: HAlign,
    cells: Vec<CellId>,
    has_content: bool,
    x: i32,
    y: i32,
    widest: i32,
}

impl LineBreaker {
    fn new(frame: Frame, align: HAlign, text_indent: i32) -> Self {
        Self {
            frame,
            align,
            cells: Vec::new(),
            has_content: false,
            x: frame.left + text_indent,
            y: frame.top,
            widest: 0,
        }
    }

    const fn limit(&self) -> i32 {
        self.frame.left + self.frame.inner
    }

    /// Trailing whitespace may hang past the right indent.
    const fn fits(&self, cell: &Cell) -> bool {
        self.x + cell.rect.width - cell.trailing_space() <= self.limit()
    }

    fn push(&mut self, tree: &mut CellTree, id: CellId) {
        let cell = &mut tree[id];
        cell.rect.x = self.x;
        if !cell.is_formatting() {
            self.x += cell.rect.width;
            self.has_content = true;
        }
        self.cells.push(id);
    }

    /// Place the pending cells as one line. `last` lines are never
    /// justified.
    fn finish(&mut self, tree: &mut CellTree, last: bool) {
        if self.cells.is_empty() {
            return;
        }

        // Vertical: align every baseline.
        let mut above = 0;
        let mut below = 0;
        for &id in &self.cells {
            let cell = &tree[id];
            if !cell.is_formatting() {
                above = above.max(cell.ascent());
                below = below.max(cell.depth());
            }
        }
        let baseline = self.y + above;
        for &id in &self.cells {
            let cell = &mut tree[id];
            cell.rect.y = if cell.is_formatting() {
                self.y
            } else {
                baseline - cell.ascent()
            };
        }

        // Horizontal: alignment, then justification gaps.
        let trailing = self
            .cells
            .iter()
            .rev()
            .find(|&&id| !tree[id].is_formatting())
            .map_or(0, |&id| tree[id].trailing_space());
        let used = self.x - trailing;
        let slack = self.limit() - used;
        let shift = match self.align {
            HAlign::Center => slack.max(0) / 2,
            HAlign::Right => slack.max(0),
            HAlign::Left | HAlign::Justify => 0,
        };
        let gaps = if self.align == HAlign::Justify && !last && slack > 0 {
            self.cells
                .iter()
                .filter(|&&id| !tree[id].is_formatting())
                .skip(1)
                .filter(|&&id| tree[id].break_before)
                .count() as i32
        } else {
            0
        };
        let mut offset = shift;
        let mut gap = 0;
        let mut seen_visible = false;
        for &id in &self.cells {
            let cell = &mut tree[id];
            if gaps > 0 && !cell.is_formatting() {
                if seen_visible && cell.break_before {
                    gap += 1;
                    // Cumulative share, so the gaps sum to the slack exactly.
                    offset = shift + slack * gap / gaps;
                }
                seen_visible = true;
            }
            cell.rect.x += offset;
        }

        self.widest = self.widest.max(used);
        self.y = baseline + below;
        self.cells.clear();
        self.has_content = false;
        self.x = self.frame.left;
    }
}
