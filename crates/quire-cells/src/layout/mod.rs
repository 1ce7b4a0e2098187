//! Layout: assigning positions and sizes to cells for a given width.
//!
//! Layout is recursive. A container lays out its children at its content
//! width and then arranges them: flow containers break them into lines,
//! tables place them on a grid and lists pair markers with items. Laying out
//! a container twice at the same width is a no-op; any change to its
//! subtree drops the cached width.

pub mod flow;
pub mod list;
pub mod table;

use crate::cell::{CellId, CellKind};
use crate::container::{ContainerData, ContainerKind};
use crate::geometry::{Length, MAX_LENGTH};
use crate::tree::CellTree;

/// Width used to measure the narrowest a container can get.
pub const NARROW_WIDTH: i32 = 1;

/// Maximum width reported by content that may grow without bound.
pub const UNBOUNDED_WIDTH: i32 = i32::MAX / 4;

impl CellTree {
    /// Lay out the cell `id` and its subtree for `width` pixels.
    ///
    /// A width of zero or less is degenerate: every descendant is placed at
    /// the origin and containers report zero size.
    pub fn layout(&mut self, id: CellId, width: i32) {
        layout_cell(self, id, width);
    }

    /// Distance from the top of `id` to the baseline of its first line.
    #[must_use]
    pub fn first_baseline(&self, id: CellId) -> i32 {
        baseline(self, id)
    }
}

pub(crate) fn layout_cell(tree: &mut CellTree, id: CellId, width: i32) {
    if width <= 0 {
        collapse(tree, id);
        return;
    }
    let Some(cell) = tree.get(id) else {
        return;
    };
    let arrange: fn(&mut CellTree, CellId, i32) = match &cell.kind {
        CellKind::Container(data) if data.last_layout == Some(width) => return,
        CellKind::Container(data) => match data.kind {
            ContainerKind::Block => flow::layout_block,
            ContainerKind::Table(_) => table::layout_table,
            ContainerKind::List(_) => list::layout_list,
        },
        CellKind::Rule(rule) => {
            let resolved = rule.width.resolve_width(width).max(0);
            tree[id].rect.width = resolved;
            return;
        }
        _ => return,
    };
    arrange(tree, id, width);
    if let Some(data) = tree.container_mut(id) {
        data.last_layout = Some(width);
    }
    #[cfg(feature = "layout-trace")]
    log::trace!(
        target: "quire.layout",
        "{} {id:?} at {width}: {:?}",
        tree[id].kind_name(),
        tree[id].rect
    );
}

/// Degenerate layout: everything at the origin, containers empty.
fn collapse(tree: &mut CellTree, id: CellId) {
    let mut pending = vec![id];
    while let Some(current) = pending.pop() {
        pending.extend(tree.children(current));
        let Some(cell) = tree.get_mut(current) else {
            continue;
        };
        if current != id {
            cell.rect.x = 0;
            cell.rect.y = 0;
        }
        match &mut cell.kind {
            CellKind::Container(data) => {
                data.last_layout = None;
                data.max_line_width = 0;
                cell.rect.width = 0;
                cell.rect.height = 0;
            }
            CellKind::Rule(_) => cell.rect.width = 0,
            _ => {}
        }
    }
}

/// Offset of the first baseline from the top of `id`: the baseline of the
/// first visible terminal cell, accumulated through nested containers.
pub(crate) fn baseline(tree: &CellTree, id: CellId) -> i32 {
    let Some(cell) = tree.get(id) else {
        return 0;
    };
    if cell.is_terminal() {
        return cell.ascent();
    }
    tree.children(id)
        .find(|&child| !tree[child].is_formatting())
        .map_or(cell.rect.height, |child| {
            tree[child].rect.y + baseline(tree, child)
        })
}

/// Resolved box of a container laid out at some available width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    /// Outer width before content overflow.
    pub width: i32,
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    /// Width between the left and right indents.
    pub inner: i32,
}

impl Frame {
    /// Widths are capped at [`UNBOUNDED_WIDTH`] and indents at
    /// [`MAX_LENGTH`] so the sums taken during layout cannot overflow.
    pub(crate) fn resolve(data: &ContainerData, available: i32) -> Self {
        let width = data
            .width
            .resolve_width(available)
            .clamp(0, UNBOUNDED_WIDTH);
        let indent = |length: Length| length.resolve(width).clamp(-MAX_LENGTH, MAX_LENGTH);
        let left = indent(data.indent.left);
        let right = indent(data.indent.right);
        Self {
            width,
            left,
            right,
            top: indent(data.indent.top),
            bottom: indent(data.indent.bottom),
            inner: width.saturating_sub(left).saturating_sub(right),
        }
    }
}
