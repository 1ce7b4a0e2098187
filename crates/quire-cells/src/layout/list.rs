//! List layout: a column of markers beside a column of items.
//!
//! The marker column is as wide as the widest marker. Each marker is
//! vertically offset so that its first baseline lines up with the first
//! baseline of its item.

use super::{Frame, NARROW_WIDTH, baseline, layout_cell};
use crate::cell::CellId;
use crate::container::{ContainerData, ContainerKind};
use crate::geometry::HAlign;
use crate::tree::CellTree;

/// Bullet used by unordered lists.
pub const BULLET: &str = "\u{2022}";

/// The two containers making up one list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem {
    /// Container holding the marker.
    pub marker: CellId,
    /// Container holding the item content.
    pub content: CellId,
}

/// List payload of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListData {
    /// Items in order.
    pub items: Vec<ListItem>,
    /// Numbered rather than bulleted.
    pub ordered: bool,
    /// Number of the next ordered item.
    pub next_number: i32,
    /// Space between the marker column and the items.
    pub gap: i32,
    /// Width of the marker column after the last layout.
    pub marker_width: i32,
}

impl ListData {
    /// An empty list. Ordered lists count from `start`.
    #[must_use]
    pub fn new(ordered: bool, start: i32, gap: i32) -> Self {
        Self {
            items: Vec::new(),
            ordered,
            next_number: start,
            gap,
            marker_width: 0,
        }
    }

    /// Text of the next marker: `"3."` for ordered lists, a bullet otherwise.
    pub fn next_marker(&mut self) -> String {
        if self.ordered {
            let number = self.next_number;
            self.next_number = self.next_number.saturating_add(1);
            format!("{number}.")
        } else {
            BULLET.to_string()
        }
    }
}

impl CellTree {
    /// Append a list container to `parent`.
    pub fn push_list(&mut self, parent: CellId, list: ListData) -> CellId {
        self.push_container(parent, ContainerData::new(ContainerKind::List(list)))
    }

    /// Add an item to `list`, or `None` if `list` is not a list.
    pub fn push_list_item(&mut self, list: CellId) -> Option<ListItem> {
        let _ = self.container(list)?.list()?;
        let marker = self.push_container(
            list,
            ContainerData {
                align_h: HAlign::Right,
                ..ContainerData::default()
            },
        );
        let content = self.push_block(list);
        let item = ListItem { marker, content };
        self.container_mut(list)?.list_mut()?.items.push(item);
        Some(item)
    }
}

pub(super) fn layout_list(tree: &mut CellTree, id: CellId, available: i32) {
    let Some(data) = tree.container(id) else {
        return;
    };
    let frame = Frame::resolve(data, available);
    let Some(list) = data.list() else {
        return;
    };
    let items = list.items.clone();
    let gap = list.gap;

    // STEP 1: The marker column fits the widest marker.
    let mut marker_width = 0;
    for item in &items {
        layout_cell(tree, item.marker, NARROW_WIDTH);
        marker_width = marker_width.max(tree[item.marker].rect.width);
    }
    let content_left = frame.left + marker_width + gap;
    let content_width = (frame.inner - marker_width - gap).max(NARROW_WIDTH);

    // STEP 2: Stack the items, aligning each marker with its first line.
    let mut y = frame.top;
    let mut widest = 0;
    let mut widest_total = 0;
    for item in &items {
        layout_cell(tree, item.marker, marker_width.max(NARROW_WIDTH));
        layout_cell(tree, item.content, content_width);
        let marker_baseline = baseline(tree, item.marker);
        let content_baseline = baseline(tree, item.content);
        let (marker_y, content_y) = if marker_baseline < content_baseline {
            (y + content_baseline - marker_baseline, y)
        } else {
            (y, y + marker_baseline - content_baseline)
        };

        let marker = &mut tree[item.marker].rect;
        marker.x = frame.left;
        marker.y = marker_y;
        let marker_bottom = marker.bottom();
        let content = &mut tree[item.content].rect;
        content.x = content_left;
        content.y = content_y;
        let content_bottom = content.bottom();
        widest = widest.max(content.width);
        widest_total = widest_total.max(
            tree.container(item.content)
                .map_or(0, |d| d.max_total_width),
        );
        y = marker_bottom.max(content_bottom);
    }

    let max_line_width = content_left + widest + frame.right;
    let cell = &mut tree[id];
    cell.rect.width = frame.width.max(max_line_width);
    cell.rect.height = y + frame.bottom;
    if let Some(data) = cell.as_container_mut() {
        data.max_line_width = max_line_width;
        data.max_total_width = content_left + widest_total + frame.right;
        if let Some(list) = data.list_mut() {
            list.marker_width = marker_width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_count_from_start() {
        let mut list = ListData::new(true, 3, 4);
        assert_eq!(list.next_marker(), "3.");
        assert_eq!(list.next_marker(), "4.");
        let mut bullets = ListData::new(false, 1, 4);
        assert_eq!(bullets.next_marker(), BULLET);
    }

    #[test]
    fn test_push_list_item_requires_list() {
        let mut tree = CellTree::new();
        let block = tree.push_block(CellId::ROOT);
        assert!(tree.push_list_item(block).is_none());
        let list = tree.push_list(CellId::ROOT, ListData::new(false, 1, 4));
        let item = tree.push_list_item(list);
        assert!(item.is_some());
        assert_eq!(tree.children(list).count(), 2);
    }
}
