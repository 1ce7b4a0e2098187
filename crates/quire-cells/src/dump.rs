//! Serializable snapshot of a laid-out tree, for debugging and tooling.

use serde::Serialize;

use crate::cell::{CellId, CellKind};
use crate::geometry::Rect;
use crate::tree::CellTree;

/// One cell and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDump {
    /// Kind name, e.g. `word` or `table`.
    pub kind: &'static str,
    /// Geometry relative to the parent.
    pub rect: Rect,
    /// Text of words, alt text of images, names of anchors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Link target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Children of containers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CellDump>,
}

impl CellTree {
    /// Snapshot `id` and everything below it.
    #[must_use]
    pub fn dump(&self, id: CellId) -> Option<CellDump> {
        let cell = self.get(id)?;
        let text = match &cell.kind {
            CellKind::Word(word) => Some(word.text.clone()),
            CellKind::Image(image) => Some(image.alt.clone()),
            CellKind::Anchor(name) => Some(name.clone()),
            CellKind::Widget(widget) => Some(widget.label.clone()),
            CellKind::Color(change) => Some(change.color.to_hex_string()),
            _ => None,
        };
        Some(CellDump {
            kind: cell.kind_name(),
            rect: cell.rect,
            text,
            link: cell.link.as_ref().map(|l| l.href.clone()),
            children: self
                .children(id)
                .filter_map(|child| self.dump(child))
                .collect(),
        })
    }
}

impl CellDump {
    /// Indented one-line-per-cell rendering.
    #[must_use]
    pub fn to_outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let r = self.rect;
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{} ({}, {}) {}x{}", self.kind, r.x, r.y, r.width, r.height));
        if let Some(text) = &self.text {
            out.push_str(&format!(" {text:?}"));
        }
        if let Some(link) = &self.link {
            out.push_str(&format!(" -> {link}"));
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}
