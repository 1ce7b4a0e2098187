//! Container payload: children, box properties and layout caches.

use crate::cell::CellId;
use crate::geometry::{Color, HAlign, Indents, Length, VAlign};
use crate::layout::list::ListData;
use crate::layout::table::TableData;

/// A 3D border: light on the top and left edges, dark on the bottom and
/// right. Swapping the colours gives a sunken look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    /// Line width in pixels.
    pub width: i32,
    /// Top and left colour.
    pub light: Color,
    /// Bottom and right colour.
    pub dark: Color,
}

impl Border {
    /// A raised border.
    #[must_use]
    pub const fn raised(width: i32) -> Self {
        Self {
            width,
            light: Color::LIGHT_GREY,
            dark: Color::DARK_GREY,
        }
    }

    /// A sunken border.
    #[must_use]
    pub const fn sunken(width: i32) -> Self {
        Self {
            width,
            light: Color::DARK_GREY,
            dark: Color::LIGHT_GREY,
        }
    }
}

/// How a container arranges its children.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerKind {
    /// Inline flow with line breaking.
    Block,
    /// Grid of cell containers.
    Table(Box<TableData>),
    /// Marker column plus item column.
    List(ListData),
}

impl ContainerKind {
    /// Short name used in dumps.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Block => "container",
            Self::Table(_) => "table",
            Self::List(_) => "list",
        }
    }
}

/// Payload of a container cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerData {
    /// First child.
    pub first_child: Option<CellId>,
    /// Last child, for O(1) append.
    pub last_child: Option<CellId>,
    /// Arrangement.
    pub kind: ContainerKind,
    /// Horizontal alignment of lines.
    pub align_h: HAlign,
    /// Vertical alignment of the content when a minimum height pads it.
    pub align_v: VAlign,
    /// Indents on the four sides.
    pub indent: Indents,
    /// Indent of the first line only.
    pub text_indent: i32,
    /// Requested width; percentages resolve against the available width.
    pub width: Length,
    /// Lines are never broken.
    pub nowrap: bool,
    /// Fill colour.
    pub background: Option<Color>,
    /// Border drawn around the container.
    pub border: Option<Border>,
    /// Minimum height.
    pub min_height: i32,
    /// Width of the last layout, `None` once invalidated.
    pub last_layout: Option<i32>,
    /// Widest the content can get without breaking any line.
    pub max_total_width: i32,
    /// Right edge of the widest line of the last layout.
    pub max_line_width: i32,
}

impl Default for ContainerData {
    fn default() -> Self {
        Self::new(ContainerKind::Block)
    }
}

impl ContainerData {
    /// Full-width container of `kind` with no indents.
    #[must_use]
    pub const fn new(kind: ContainerKind) -> Self {
        Self {
            first_child: None,
            last_child: None,
            kind,
            align_h: HAlign::Left,
            align_v: VAlign::Top,
            indent: Indents::uniform(0),
            text_indent: 0,
            width: Length::FULL,
            nowrap: false,
            background: None,
            border: None,
            min_height: 0,
            last_layout: None,
            max_total_width: 0,
            max_line_width: 0,
        }
    }

    /// Table payload, if this is a table.
    #[must_use]
    pub fn table(&self) -> Option<&TableData> {
        match &self.kind {
            ContainerKind::Table(table) => Some(table.as_ref()),
            _ => None,
        }
    }

    /// Mutable table payload, if this is a table.
    pub fn table_mut(&mut self) -> Option<&mut TableData> {
        match &mut self.kind {
            ContainerKind::Table(table) => Some(table.as_mut()),
            _ => None,
        }
    }

    /// List payload, if this is a list.
    #[must_use]
    pub const fn list(&self) -> Option<&ListData> {
        match &self.kind {
            ContainerKind::List(list) => Some(list),
            _ => None,
        }
    }

    /// Mutable list payload, if this is a list.
    pub fn list_mut(&mut self) -> Option<&mut ListData> {
        match &mut self.kind {
            ContainerKind::List(list) => Some(list),
            _ => None,
        }
    }

    /// Set the minimum height, dropping the layout cache when it changes.
    pub fn set_min_height(&mut self, height: i32, align: VAlign) {
        if self.min_height != height || self.align_v != align {
            self.min_height = height;
            self.align_v = align;
            self.last_layout = None;
        }
    }
}
