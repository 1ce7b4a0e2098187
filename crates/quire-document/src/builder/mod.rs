//! Building the cell tree from parser events.
//!
//! [`TreeBuilder`] is the [`DocumentHandler`] the parser drives. It keeps a
//! "current container" that words and newly opened elements attach to, and
//! explicit stacks for everything that opens in one callback and closes in
//! another: font frames, links, blocks, tables, lists and form controls.
//!
//! The tag set is closed. An element the builder does not know is a parse
//! error, not something to skip.

mod block;
mod forms;
mod style;
mod text;

pub use forms::sync_widgets;
pub use style::{FONT_SIZES, SMALL_CAPS_PERCENT, font_size_percent};

use std::io::Read;
use std::str::FromStr;

use quire_cells::{
    CellId, CellKind, CellTree, Color, ContainerData, ContainerKind, FontId, HAlign, Length,
    LinkInfo, RenderContext, ScriptMode, VAlign,
};
use quire_common::location::resolve_location;
use quire_common::warning::warn_once;
use quire_markup::{
    Attributes, DocumentHandler, HandlerResult, MarkupParser, ParseError, ParseErrorKind,
};

use crate::error::BuildError;
use crate::forms::FormSet;
use crate::images::ImageStore;
use crate::resource::ResourceOpener;
use block::{ListFrame, TableFrame};
use forms::ControlFrame;
use style::FontStack;
use text::TextState;

/// The elements of the dialect.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum Tag {
    /// `<html>`
    Html,
    /// `<head>`
    Head,
    /// `<title>`
    Title,
    /// `<meta>`
    Meta,
    /// `<body>`
    Body,
    /// `<p>`
    P,
    /// `<br>`
    Br,
    /// `<a>`
    A,
    /// `<font>`
    Font,
    /// `<b>`
    B,
    /// `<i>`
    I,
    /// `<em>`
    Em,
    /// `<u>`
    U,
    /// `<sc>`, small capitals.
    Sc,
    /// `<tt>`, fixed-pitch text.
    Tt,
    /// `<code>`, fixed-pitch text.
    Code,
    /// `<sup>`
    Sup,
    /// `<sub>`
    Sub,
    /// `<h1>`
    H1,
    /// `<h2>`
    H2,
    /// `<h3>`
    H3,
    /// `<hr>`
    Hr,
    /// `<pagebreak>`
    Pagebreak,
    /// `<img>`
    Img,
    /// `<table>`
    Table,
    /// `<tr>`
    Tr,
    /// `<td>`
    Td,
    /// `<th>`
    Th,
    /// `<ul>`
    Ul,
    /// `<ol>`
    Ol,
    /// `<li>`
    Li,
    /// `<dl>`
    Dl,
    /// `<dt>`
    Dt,
    /// `<dd>`
    Dd,
    /// `<div>`
    Div,
    /// `<form>`
    Form,
    /// `<input>`
    Input,
    /// `<select>`
    Select,
    /// `<option>`
    #[strum(serialize = "option")]
    SelectOption,
    /// `<radiobox>`
    Radiobox,
}

/// The result of building a document.
#[derive(Debug)]
pub struct BuiltDocument {
    /// The cell tree.
    pub tree: CellTree,
    /// Its root container.
    pub root: CellId,
    /// Text of `<title>`, whitespace collapsed.
    pub title: Option<String>,
    /// Forms declared by the document.
    pub forms: FormSet,
    /// Images referenced by the document that could be decoded.
    pub images: ImageStore,
}

/// Parse `input` and build its cell tree.
///
/// `base` is the location of the document; relative image sources resolve
/// against it.
///
/// # Errors
///
/// Returns the first syntax or semantic error, with its position.
pub fn build_document<R: Read>(
    input: R,
    ctx: &mut RenderContext,
    opener: &dyn ResourceOpener,
    base: Option<&str>,
) -> Result<BuiltDocument, ParseError> {
    let mut builder = TreeBuilder::new(ctx, opener).with_base(base.map(str::to_string));
    MarkupParser::new().parse(&mut builder, input)?;
    Ok(builder.finish())
}

/// Turns parser events into a cell tree.
pub struct TreeBuilder<'a> {
    ctx: &'a mut RenderContext,
    opener: &'a dyn ResourceOpener,
    base: Option<String>,
    tree: CellTree,
    current: CellId,
    fonts: FontStack,
    links: Vec<Option<LinkInfo>>,
    blocks: Vec<Tag>,
    tables: Vec<TableFrame>,
    lists: Vec<ListFrame>,
    text: TextState,
    link_color: Color,
    emitted_color: Color,
    emitted_font: Option<FontId>,
    in_head: bool,
    in_title: bool,
    title: Option<String>,
    forms: FormSet,
    form: Option<usize>,
    control: Option<ControlFrame>,
    images: ImageStore,
}

impl std::fmt::Debug for TreeBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("current", &self.current)
            .field("cells", &self.tree.len())
            .field("blocks", &self.blocks)
            .finish_non_exhaustive()
    }
}

impl<'a> TreeBuilder<'a> {
    /// A builder producing cells measured and realized through `ctx`.
    pub fn new(ctx: &'a mut RenderContext, opener: &'a dyn ResourceOpener) -> Self {
        let text_color = ctx.config.text_color;
        let link_color = ctx.config.link_color;
        let tree = CellTree::new();
        let current = tree.root();
        Self {
            ctx,
            opener,
            base: None,
            tree,
            current,
            fonts: FontStack::new(text_color),
            links: Vec::new(),
            blocks: Vec::new(),
            tables: Vec::new(),
            lists: Vec::new(),
            text: TextState::default(),
            link_color,
            emitted_color: text_color,
            emitted_font: None,
            in_head: false,
            in_title: false,
            title: None,
            forms: FormSet::new(),
            form: None,
            control: None,
            images: ImageStore::new(),
        }
    }

    /// Resolve relative image sources against `base`.
    #[must_use]
    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base = base;
        self
    }

    /// The container new cells are appended to.
    #[must_use]
    pub const fn current_container(&self) -> CellId {
        self.current
    }

    /// Hand over the finished tree.
    #[must_use]
    pub fn finish(mut self) -> BuiltDocument {
        sync_widgets(&mut self.tree, &self.forms);
        let root = self.tree.root();
        BuiltDocument {
            tree: self.tree,
            root,
            title: self.title,
            forms: self.forms,
            images: self.images,
        }
    }

    // -----------------------------------------------------------------------
    // Container navigation
    // -----------------------------------------------------------------------

    /// Append a container to the current one and make it current.
    fn open_container(&mut self, tag: Tag, data: ContainerData) -> Result<CellId, BuildError> {
        if self.in_grid() {
            return Err(BuildError::MisplacedContent(tag.to_string()));
        }
        let id = self.tree.push_container(self.current, data);
        self.set_container(id);
        Ok(id)
    }

    /// Make the parent of the current container current.
    fn close_container(&mut self, tag: Tag) -> Result<(), BuildError> {
        let parent = self
            .tree
            .parent(self.current)
            .ok_or_else(|| BuildError::CloseRootContainer(tag.to_string()))?;
        self.set_container(parent);
        Ok(())
    }

    fn set_container(&mut self, id: CellId) {
        self.current = id;
        self.text.reset_line();
    }

    /// The current container arranges its children itself, so only
    /// dedicated markup may add to it.
    fn in_grid(&self) -> bool {
        self.tree
            .container(self.current)
            .is_some_and(|data| !matches!(data.kind, ContainerKind::Block))
    }

    fn open_block(&mut self, tag: Tag, data: ContainerData) -> Result<(), BuildError> {
        let _ = self.open_container(tag, data)?;
        self.blocks.push(tag);
        Ok(())
    }

    fn close_block(&mut self, tag: Tag) -> Result<(), BuildError> {
        let open = self
            .blocks
            .pop()
            .ok_or_else(|| BuildError::CloseRootContainer(tag.to_string()))?;
        if open != tag {
            return Err(BuildError::BlockMismatch {
                expected: open.to_string(),
                found: tag.to_string(),
            });
        }
        self.close_container(tag)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    fn open_tag(&mut self, tag: Tag, attrs: &Attributes) -> Result<(), BuildError> {
        log::trace!(target: "quire.document", "open <{tag}> in {:?}", self.current);
        match tag {
            Tag::Html | Tag::Meta => {}
            Tag::Head => self.in_head = true,
            Tag::Title => {
                self.in_title = true;
                self.title = Some(String::new());
            }
            Tag::Body => self.apply_body(attrs),
            Tag::P | Tag::Dl => self.open_paragraph(tag, attrs, true)?,
            Tag::Div | Tag::Dt => self.open_paragraph(tag, attrs, false)?,
            Tag::Dd => self.open_definition(attrs)?,
            Tag::H1 | Tag::H2 | Tag::H3 => self.open_heading(tag, attrs)?,
            Tag::Br => self.line_break(false),
            Tag::Pagebreak => self.line_break(true),
            Tag::A => self.open_anchor(attrs),
            Tag::Font => self.open_font(attrs),
            Tag::B => self.fonts.push_with(|f| f.bold = true),
            Tag::I | Tag::Em => self.fonts.push_with(|f| f.italic = !f.italic),
            Tag::U => self.fonts.push_with(|f| f.underline = true),
            Tag::Sc => self.fonts.push_with(|f| f.small_caps = true),
            Tag::Tt | Tag::Code => self.fonts.push_with(|f| f.fixed = true),
            Tag::Sup | Tag::Sub => self.open_script(tag),
            Tag::Hr => self.horizontal_rule(attrs)?,
            Tag::Img => self.image(attrs),
            Tag::Table => self.open_table(attrs)?,
            Tag::Tr => self.open_row(attrs)?,
            Tag::Td | Tag::Th => self.open_table_cell(tag, attrs)?,
            Tag::Ul | Tag::Ol => self.open_list(tag, attrs)?,
            Tag::Li => self.open_list_item()?,
            Tag::Form => self.open_form(attrs)?,
            Tag::Input => self.input(attrs)?,
            Tag::Select => self.open_select(attrs)?,
            Tag::SelectOption => self.open_option(attrs)?,
            Tag::Radiobox => self.open_radio(attrs)?,
        }
        Ok(())
    }

    fn close_tag(&mut self, tag: Tag) -> Result<(), BuildError> {
        log::trace!(target: "quire.document", "close </{tag}>");
        match tag {
            Tag::Html
            | Tag::Meta
            | Tag::Body
            | Tag::Br
            | Tag::Pagebreak
            | Tag::Hr
            | Tag::Img
            | Tag::Input => {}
            Tag::Head => self.in_head = false,
            Tag::Title => {
                self.in_title = false;
                self.title = self
                    .title
                    .take()
                    .map(|title| title.split_whitespace().collect::<Vec<_>>().join(" "));
            }
            Tag::P | Tag::Div | Tag::Dl | Tag::Dt | Tag::Dd => self.close_block(tag)?,
            Tag::H1 | Tag::H2 | Tag::H3 => {
                let _ = self.fonts.pop(tag)?;
                self.close_block(tag)?;
            }
            Tag::A => self.close_anchor()?,
            Tag::Font
            | Tag::B
            | Tag::I
            | Tag::Em
            | Tag::U
            | Tag::Sc
            | Tag::Tt
            | Tag::Code
            | Tag::Sup
            | Tag::Sub => {
                let _ = self.fonts.pop(tag)?;
            }
            Tag::Table => self.close_table()?,
            Tag::Tr => self.close_row()?,
            Tag::Td | Tag::Th => self.close_table_cell(tag)?,
            Tag::Ul | Tag::Ol => self.close_list()?,
            Tag::Li => self.close_list_item()?,
            Tag::Form => self.close_form()?,
            Tag::Select => self.close_select()?,
            Tag::SelectOption => self.close_option()?,
            Tag::Radiobox => self.close_radio()?,
        }
        Ok(())
    }

    /// Every stack must be back at its base when the document ends.
    fn check_balanced(&self) -> Result<(), BuildError> {
        let stacks = [
            ("font", self.fonts.depth() > 0),
            ("link", !self.links.is_empty()),
            ("block", !self.blocks.is_empty()),
            ("table", !self.tables.is_empty()),
            ("list", !self.lists.is_empty()),
            ("form", self.form.is_some() || self.control.is_some()),
            ("container", self.current != self.tree.root()),
        ];
        match stacks.iter().find(|(_, open)| *open) {
            Some((name, _)) => Err(BuildError::UnbalancedStacks(*name)),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Document-level and inline style tags
    // -----------------------------------------------------------------------

    fn apply_body(&mut self, attrs: &Attributes) {
        if let Some(color) = color_attr(attrs, "bgcolor") {
            let root = self.tree.root();
            if let Some(data) = self.tree.container_mut(root) {
                data.background = Some(color);
            }
        }
        if let Some(color) = color_attr(attrs, "text") {
            self.fonts.set_base_color(color);
        }
        if let Some(color) = color_attr(attrs, "link") {
            self.link_color = color;
        }
    }

    fn open_anchor(&mut self, attrs: &Attributes) {
        if let Some(name) = attrs.get("name") {
            let _ = self.push_marker(CellKind::Anchor(name.clone()));
        }
        match attrs.get("href") {
            Some(href) => {
                self.links.push(Some(LinkInfo {
                    href: href.clone(),
                    target: attrs.get("target").cloned(),
                }));
                let color = self.link_color;
                self.fonts.push_with(|f| {
                    f.color = color;
                    f.underline = true;
                });
            }
            None => self.links.push(None),
        }
    }

    fn close_anchor(&mut self) -> Result<(), BuildError> {
        match self.links.pop() {
            Some(Some(_)) => self.fonts.pop(Tag::A).map(|_| ()),
            Some(None) => Ok(()),
            None => Err(BuildError::LinkStackUnderflow),
        }
    }

    fn open_font(&mut self, attrs: &Attributes) {
        let size = attrs.get("size").and_then(|value| {
            let size = font_size_percent(value);
            if size.is_none() {
                let _ = warn_once("builder", &format!("ignoring font size \"{value}\""));
            }
            size
        });
        let color = color_attr(attrs, "color");
        let face = attrs.get("face").cloned();
        self.fonts.push_with(|f| {
            if let Some(size) = size {
                f.size_percent = size;
            }
            if let Some(color) = color {
                f.color = color;
            }
            if face.is_some() {
                f.face = face;
            }
        });
    }

    fn open_script(&mut self, tag: Tag) {
        let mode = if tag == Tag::Sup {
            ScriptMode::Superscript
        } else {
            ScriptMode::Subscript
        };
        let font = self.ctx.realize(self.fonts.current());
        let line_size = self.ctx.font(font).map_or(0.0, |spec| spec.size);
        self.fonts
            .push_with(|f| style::apply_script(f, mode, line_size));
    }

    /// Resolve an attribute location against the document location.
    fn resolve(&self, href: &str) -> String {
        resolve_location(href, self.base.as_deref())
    }
}

impl DocumentHandler for TreeBuilder<'_> {
    fn end_document(&mut self) -> HandlerResult {
        self.emit_word();
        self.check_balanced().map_err(Into::into)
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> HandlerResult {
        let tag =
            Tag::from_str(name).map_err(|_| ParseErrorKind::UnknownStartTag(name.to_string()))?;
        self.emit_word();
        self.open_tag(tag, attributes).map_err(Into::into)
    }

    fn end_element(&mut self, name: &str) -> HandlerResult {
        let tag =
            Tag::from_str(name).map_err(|_| ParseErrorKind::UnknownEndTag(name.to_string()))?;
        self.emit_word();
        self.close_tag(tag).map_err(Into::into)
    }

    fn text(&mut self, text: &str) -> HandlerResult {
        self.add_text(text);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Attribute helpers
// ---------------------------------------------------------------------------

fn ignored(name: &str, value: &str) {
    let _ = warn_once("builder", &format!("ignoring {name}=\"{value}\""));
}

fn length_attr(attrs: &Attributes, name: &str) -> Option<Length> {
    let value = attrs.get(name)?;
    let length = Length::parse(value);
    if length.is_none() {
        ignored(name, value);
    }
    length
}

fn pixels_attr(attrs: &Attributes, name: &str) -> Option<i32> {
    match length_attr(attrs, name)? {
        Length::Pixels(px) => Some(px),
        Length::Percent(_) => {
            ignored(name, &attrs[name]);
            None
        }
    }
}

/// A non-negative count, clamped to `max` with a warning.
fn count_attr(attrs: &Attributes, name: &str, max: usize) -> Option<usize> {
    let value = attrs.get(name)?;
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        ignored(name, value);
        return None;
    }
    // All digits: a parse failure can only be overflow.
    let count = digits.parse::<usize>().unwrap_or(usize::MAX);
    if count > max {
        let _ = warn_once("builder", &format!("clamping {name}=\"{value}\" to {max}"));
        return Some(max);
    }
    Some(count)
}

fn color_attr(attrs: &Attributes, name: &str) -> Option<Color> {
    let value = attrs.get(name)?;
    let color = Color::parse(value);
    if color.is_none() {
        ignored(name, value);
    }
    color
}

fn align_attr(attrs: &Attributes, name: &str) -> Option<HAlign> {
    let value = attrs.get(name)?;
    let align = HAlign::from_str(value.trim()).ok();
    if align.is_none() {
        ignored(name, value);
    }
    align
}

fn valign_attr(attrs: &Attributes, name: &str) -> Option<VAlign> {
    let value = attrs.get(name)?;
    let align = VAlign::from_str(value.trim()).ok();
    if align.is_none() {
        ignored(name, value);
    }
    align
}
