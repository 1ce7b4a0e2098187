//! Arena storage for the cell tree.
//!
//! Cells refer to each other through [`CellId`] indices: every cell knows its
//! parent and next sibling, and containers know their first and last child.
//! Released cells become [`CellKind::Vacant`] and their slots are reused.

use std::ops::{Index, IndexMut};

use crate::cell::{Cell, CellId, CellKind};
use crate::container::{ContainerData, ContainerKind};

impl CellId {
    /// The root container is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// Owner of every cell of one document.
#[derive(Debug, Clone)]
pub struct CellTree {
    cells: Vec<Cell>,
    free: Vec<CellId>,
}

impl CellTree {
    /// A tree holding only an empty root container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::new(CellKind::Container(Box::default()))],
            free: Vec::new(),
        }
    }

    /// The root container.
    #[must_use]
    pub const fn root(&self) -> CellId {
        CellId::ROOT
    }

    /// Get a live cell.
    #[must_use]
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells
            .get(id.0)
            .filter(|cell| !matches!(cell.kind, CellKind::Vacant))
    }

    /// Get a live cell mutably.
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells
            .get_mut(id.0)
            .filter(|cell| !matches!(cell.kind, CellKind::Vacant))
    }

    /// Number of live cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len() - self.free.len()
    }

    /// Never true: the root always exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a detached cell and return its id.
    pub fn alloc(&mut self, mut cell: Cell) -> CellId {
        cell.parent = None;
        cell.next = None;
        if let Some(id) = self.free.pop() {
            self.cells[id.0] = cell;
            id
        } else {
            let id = CellId(self.cells.len());
            self.cells.push(cell);
            id
        }
    }

    /// Append `child` as the last child of the container `parent`.
    ///
    /// Does nothing if `parent` is not a container.
    pub fn append_child(&mut self, parent: CellId, child: CellId) {
        let Some(data) = self.container_mut(parent) else {
            log::warn!(target: "quire.layout", "append to non-container {parent:?} ignored");
            return;
        };
        let previous_last = data.last_child.replace(child);
        if data.first_child.is_none() {
            data.first_child = Some(child);
        }
        if let Some(previous) = previous_last {
            self.cells[previous.0].next = Some(child);
        }
        self.cells[child.0].parent = Some(parent);
        self.cells[child.0].next = None;
        self.invalidate(parent);
    }

    /// Allocate `cell` and append it to `parent`.
    pub fn push(&mut self, parent: CellId, cell: Cell) -> CellId {
        let id = self.alloc(cell);
        self.append_child(parent, id);
        id
    }

    /// Allocate a container of `kind` and append it to `parent`.
    pub fn push_container(&mut self, parent: CellId, data: ContainerData) -> CellId {
        self.push(parent, Cell::new(CellKind::Container(Box::new(data))))
    }

    /// Allocate an empty flow container and append it to `parent`.
    pub fn push_block(&mut self, parent: CellId) -> CellId {
        self.push_container(parent, ContainerData::new(ContainerKind::Block))
    }

    /// Detach `id` from its parent and release it with all its descendants.
    ///
    /// The root cannot be released.
    pub fn release(&mut self, id: CellId) {
        if id == CellId::ROOT || self.get(id).is_none() {
            return;
        }
        self.detach(id);
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            pending.extend(self.children(current));
            self.cells[current.0] = Cell::new(CellKind::Vacant);
            self.free.push(current);
        }
    }

    fn detach(&mut self, id: CellId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let next = self.cells[id.0].next;
        let previous = self.children(parent).take_while(|&c| c != id).last();
        match previous {
            Some(previous) => self.cells[previous.0].next = next,
            None => {
                if let Some(data) = self.container_mut(parent) {
                    data.first_child = next;
                }
            }
        }
        if let Some(data) = self.container_mut(parent) {
            if data.last_child == Some(id) {
                data.last_child = previous;
            }
        }
        self.cells[id.0].parent = None;
        self.cells[id.0].next = None;
        self.invalidate(parent);
    }

    /// Drop the layout cache of `id` and every container above it.
    pub fn invalidate(&mut self, id: CellId) {
        let mut current = Some(id);
        while let Some(cell_id) = current {
            let Some(cell) = self.cells.get_mut(cell_id.0) else {
                break;
            };
            if let Some(data) = cell.as_container_mut() {
                data.last_layout = None;
                if let Some(table) = data.table_mut() {
                    table.invalidate_measure();
                }
            }
            current = cell.parent;
        }
    }

    /// Parent of a cell.
    #[must_use]
    pub fn parent(&self, id: CellId) -> Option<CellId> {
        self.get(id).and_then(|c| c.parent)
    }

    /// Next sibling of a cell.
    #[must_use]
    pub fn next_sibling(&self, id: CellId) -> Option<CellId> {
        self.get(id).and_then(|c| c.next)
    }

    /// First child of a container.
    #[must_use]
    pub fn first_child(&self, id: CellId) -> Option<CellId> {
        self.container(id).and_then(|d| d.first_child)
    }

    /// Last child of a container.
    #[must_use]
    pub fn last_child(&self, id: CellId) -> Option<CellId> {
        self.container(id).and_then(|d| d.last_child)
    }

    /// Iterate over the children of a container, in order.
    #[must_use]
    pub fn children(&self, id: CellId) -> Children<'_> {
        Children {
            tree: self,
            current: self.first_child(id),
        }
    }

    /// Iterate over the ancestors of a cell, from its parent to the root.
    #[must_use]
    pub fn ancestors(&self, id: CellId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Container payload of a cell.
    #[must_use]
    pub fn container(&self, id: CellId) -> Option<&ContainerData> {
        self.get(id).and_then(Cell::as_container)
    }

    /// Mutable container payload of a cell.
    pub fn container_mut(&mut self, id: CellId) -> Option<&mut ContainerData> {
        self.get_mut(id).and_then(Cell::as_container_mut)
    }

    /// Position of a cell's top-left corner relative to the root.
    #[must_use]
    pub fn absolute_position(&self, id: CellId) -> (i32, i32) {
        let mut x = 0;
        let mut y = 0;
        let mut current = Some(id);
        while let Some(cell) = current.and_then(|c| self.get(c)) {
            x += cell.rect.x;
            y += cell.rect.y;
            current = cell.parent;
        }
        (x, y)
    }

    /// Whether `descendant` lies inside `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: CellId, ancestor: CellId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }
}

impl Default for CellTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<CellId> for CellTree {
    type Output = Cell;

    fn index(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }
}

impl IndexMut<CellId> for CellTree {
    fn index_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.0]
    }
}

/// Iterator over the children of a container.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    tree: &'a CellTree,
    current: Option<CellId>,
}

impl Iterator for Children<'_> {
    type Item = CellId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Iterator over the ancestors of a cell.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    tree: &'a CellTree,
    current: Option<CellId>,
}

impl Iterator for Ancestors<'_> {
    type Item = CellId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn test_append_links_siblings() {
        let mut tree = CellTree::new();
        let a = tree.push_block(CellId::ROOT);
        let b = tree.push_block(CellId::ROOT);
        let c = tree.push_block(CellId::ROOT);
        assert_eq!(tree.children(CellId::ROOT).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(tree.parent(b), Some(CellId::ROOT));
        assert_eq!(tree.last_child(CellId::ROOT), Some(c));
    }

    #[test]
    fn test_release_recycles_subtree() {
        let mut tree = CellTree::new();
        let a = tree.push_block(CellId::ROOT);
        let b = tree.push_block(CellId::ROOT);
        let _inner = tree.push_block(b);
        let c = tree.push_block(CellId::ROOT);
        assert_eq!(tree.len(), 5);

        tree.release(b);
        assert_eq!(tree.len(), 3);
        assert!(tree.get(b).is_none());
        assert_eq!(tree.children(CellId::ROOT).collect::<Vec<_>>(), vec![a, c]);

        tree.release(c);
        assert_eq!(tree.last_child(CellId::ROOT), Some(a));
        // Released slots are reused.
        let d = tree.push_block(CellId::ROOT);
        assert!(d.0 <= 4);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_append_invalidates_ancestors() {
        let mut tree = CellTree::new();
        let block = tree.push_block(CellId::ROOT);
        for id in [CellId::ROOT, block] {
            if let Some(data) = tree.container_mut(id) {
                data.last_layout = Some(100);
            }
        }
        let _ = tree.push_block(block);
        assert_eq!(tree.container(CellId::ROOT).unwrap().last_layout, None);
        assert_eq!(tree.container(block).unwrap().last_layout, None);
    }

    #[test]
    fn test_absolute_position_sums_offsets() {
        let mut tree = CellTree::new();
        let outer = tree.push_block(CellId::ROOT);
        let inner = tree.push_block(outer);
        tree[outer].rect = Rect::new(10, 20, 0, 0);
        tree[inner].rect = Rect::new(3, 4, 0, 0);
        assert_eq!(tree.absolute_position(inner), (13, 24));
    }
}
