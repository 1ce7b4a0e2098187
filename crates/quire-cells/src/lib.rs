//! Cells, box-model layout and painting.
//!
//! A document is a [`CellTree`]: containers holding words, images, rules,
//! widgets and zero-size formatting markers. [`CellTree::layout`] positions
//! everything for a given width, [`CellTree::draw`] paints the result onto a
//! [`Surface`], and the traversal helpers map points back to cells and
//! links.
//!
//! ```
//! use quire_cells::{Cell, CellId, CellTree, FontAttributes, RenderConfig, RenderContext};
//!
//! let mut ctx = RenderContext::with_approximate_metrics(RenderConfig::default());
//! let font = ctx.realize(&FontAttributes::default());
//! let mut tree = CellTree::new();
//! for word in ["hello", "world"] {
//!     let extent = ctx.measure(word, font);
//!     let _ = tree.push(CellId::ROOT, Cell::word(word, font, extent, 8));
//! }
//! tree.layout(CellId::ROOT, 400);
//! assert_eq!(tree.document_text(CellId::ROOT), "hello world");
//! ```

pub mod cell;
pub mod config;
pub mod container;
pub mod context;
pub mod dump;
pub mod font;
pub mod geometry;
pub mod layout;
pub mod paginate;
pub mod paint;
pub mod select;
pub mod traverse;
pub mod tree;

pub use cell::{
    Cell, CellId, CellKind, ColorChange, ColorTarget, ImageCell, LinkInfo, RuleCell, WidgetCell,
    WidgetKind, WordCell,
};
pub use config::RenderConfig;
pub use container::{Border, ContainerData, ContainerKind};
pub use context::RenderContext;
pub use dump::CellDump;
pub use font::{
    ApproximateMeasurer, FontAttributes, FontCache, FontId, FontSpec, ScriptMode, TextExtent,
    TextMeasurer,
};
pub use geometry::{Color, HAlign, Indents, Length, MAX_LENGTH, MAX_PERCENT, Rect, VAlign};
pub use layout::list::{ListData, ListItem};
pub use layout::table::{MAX_COLSPAN, MAX_ROWSPAN, RowStyle, TableCellSpec, TableData};
pub use paint::{DisplayCommand, DisplayList, RenderingInfo, Surface};
pub use select::{Selection, SelectionPoint};
pub use traverse::{FindCondition, PositionMode};
pub use tree::CellTree;
