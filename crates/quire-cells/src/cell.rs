//! Cells: the nodes of the layout tree.
//!
//! A cell is either terminal (a word, an image, a rule, a widget, a line
//! break or an invisible formatting marker) or a container of other cells.
//! Geometry is stored relative to the parent container.

use serde::Serialize;

use crate::container::ContainerData;
use crate::font::{FontId, ScriptMode, TextExtent};
use crate::geometry::{Color, Length, Rect};

/// Index of a cell in its [`CellTree`](crate::CellTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellId(pub usize);

/// Hyperlink attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkInfo {
    /// Link target as written in the markup.
    pub href: String,
    /// Named target frame, if any.
    pub target: Option<String>,
}

impl LinkInfo {
    /// Create a link without a target frame.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            target: None,
        }
    }
}

/// A run of text without internal break opportunities.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCell {
    /// The text, without the trailing space.
    pub text: String,
    /// Realized font.
    pub font: FontId,
    /// Width of the collapsed space that follows the word, included in the
    /// cell width.
    pub space_after: i32,
}

/// An inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCell {
    /// Resolved source location.
    pub src: String,
    /// Alternative text.
    pub alt: String,
    /// The image could not be loaded; a placeholder is drawn instead.
    pub broken: bool,
}

/// A horizontal rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleCell {
    /// Requested width, resolved at layout time.
    pub width: Length,
    /// Thickness in pixels.
    pub size: i32,
    /// Drawn flat instead of engraved.
    pub solid: bool,
}

/// Which colour a [`ColorChange`] affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorTarget {
    /// Text colour.
    Foreground,
    /// Text background.
    Background,
}

/// A zero-size marker that changes the drawing colour for the cells after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorChange {
    /// Affected colour.
    pub target: ColorTarget,
    /// New colour.
    pub color: Color,
}

/// The kind of a form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum WidgetKind {
    /// Push button that submits its form.
    Button,
    /// Single-choice drop-down list.
    ComboBox,
    /// Radio button.
    RadioBox,
}

/// An embedded form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetCell {
    /// Index of the owning form.
    pub form: usize,
    /// Index of the element within the form.
    pub element: usize,
    /// Option of the element this control stands for. Only radio buttons
    /// have more than one control per element.
    pub option: usize,
    /// Kind of control.
    pub kind: WidgetKind,
    /// Text shown on or next to the control.
    pub label: String,
    /// Checked state of a radio button.
    pub checked: bool,
}

/// What a cell is.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// A word of text.
    Word(WordCell),
    /// A forced line break. With `page_break` set it also ends the page.
    LineBreak {
        /// Also forces a page break when printing.
        page_break: bool,
    },
    /// An image.
    Image(ImageCell),
    /// A horizontal rule.
    Rule(RuleCell),
    /// Colour change marker.
    Color(ColorChange),
    /// Font change marker.
    Font(FontId),
    /// Named anchor.
    Anchor(String),
    /// Form control.
    Widget(WidgetCell),
    /// A container of other cells.
    Container(Box<ContainerData>),
    /// A released slot in the arena.
    Vacant,
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// What this cell is.
    pub kind: CellKind,
    /// Position relative to the parent container, and size.
    pub rect: Rect,
    /// Distance from the baseline to the bottom edge.
    pub descent: i32,
    /// Script placement of the text in this cell.
    pub script: ScriptMode,
    /// Baseline shift in pixels; positive lowers the cell.
    pub script_baseline: i32,
    /// Hyperlink covering this cell.
    pub link: Option<LinkInfo>,
    /// A line may be broken before this cell.
    pub break_before: bool,
    /// A page break may cut through this cell.
    pub can_split: bool,
    /// Parent container.
    pub parent: Option<CellId>,
    /// Next sibling.
    pub next: Option<CellId>,
}

impl Cell {
    /// A detached cell of `kind` with zero size.
    #[must_use]
    pub fn new(kind: CellKind) -> Self {
        let can_split = matches!(
            kind,
            CellKind::Container(_)
                | CellKind::Color(_)
                | CellKind::Font(_)
                | CellKind::Anchor(_)
                | CellKind::LineBreak { .. }
        );
        Self {
            kind,
            rect: Rect::default(),
            descent: 0,
            script: ScriptMode::Normal,
            script_baseline: 0,
            link: None,
            break_before: true,
            can_split,
            parent: None,
            next: None,
        }
    }

    /// A word cell measured as `extent`. `space_after` is added to the width.
    #[must_use]
    pub fn word(text: impl Into<String>, font: FontId, extent: TextExtent, space_after: i32) -> Self {
        let mut cell = Self::new(CellKind::Word(WordCell {
            text: text.into(),
            font,
            space_after,
        }));
        cell.rect.width = extent.width + space_after;
        cell.rect.height = extent.height;
        cell.descent = extent.descent;
        cell
    }

    /// A terminal cell with a fixed size sitting on the baseline.
    #[must_use]
    pub fn sized(kind: CellKind, width: i32, height: i32) -> Self {
        let mut cell = Self::new(kind);
        cell.rect.width = width;
        cell.rect.height = height;
        cell
    }

    /// Everything except containers is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self.kind, CellKind::Container(_))
    }

    /// Zero-size markers that only change drawing state.
    #[must_use]
    pub const fn is_formatting(&self) -> bool {
        matches!(
            self.kind,
            CellKind::Color(_) | CellKind::Font(_) | CellKind::Anchor(_)
        )
    }

    /// The line ends after this cell.
    #[must_use]
    pub const fn forces_break(&self) -> bool {
        matches!(self.kind, CellKind::LineBreak { .. })
    }

    /// Width of trailing whitespace that does not count when fitting or
    /// aligning a line.
    #[must_use]
    pub const fn trailing_space(&self) -> i32 {
        match &self.kind {
            CellKind::Word(word) => word.space_after,
            _ => 0,
        }
    }

    /// Height above the baseline, including the script shift.
    #[must_use]
    pub const fn ascent(&self) -> i32 {
        self.rect.height - self.descent - self.script_baseline
    }

    /// Depth below the baseline, including the script shift.
    #[must_use]
    pub const fn depth(&self) -> i32 {
        self.descent + self.script_baseline
    }

    /// Container payload, if this is a container.
    #[must_use]
    pub fn as_container(&self) -> Option<&ContainerData> {
        match &self.kind {
            CellKind::Container(data) => Some(data.as_ref()),
            _ => None,
        }
    }

    /// Mutable container payload, if this is a container.
    pub fn as_container_mut(&mut self) -> Option<&mut ContainerData> {
        match &mut self.kind {
            CellKind::Container(data) => Some(data.as_mut()),
            _ => None,
        }
    }

    /// Word payload, if this is a word.
    #[must_use]
    pub const fn as_word(&self) -> Option<&WordCell> {
        match &self.kind {
            CellKind::Word(word) => Some(word),
            _ => None,
        }
    }

    /// Short name of the cell kind, used in dumps and traces.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            CellKind::Word(_) => "word",
            CellKind::LineBreak { page_break: false } => "line-break",
            CellKind::LineBreak { page_break: true } => "page-break",
            CellKind::Image(_) => "image",
            CellKind::Rule(_) => "rule",
            CellKind::Color(_) => "color",
            CellKind::Font(_) => "font",
            CellKind::Anchor(_) => "anchor",
            CellKind::Widget(_) => "widget",
            CellKind::Container(data) => data.kind.name(),
            CellKind::Vacant => "vacant",
        }
    }
}
