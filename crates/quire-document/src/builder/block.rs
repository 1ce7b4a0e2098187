//! Block-level markup: paragraphs, headings, rules, images, tables and
//! lists.

use quire_cells::{
    Cell, CellId, CellKind, ContainerData, HAlign, ImageCell, Indents, Length, ListData,
    MAX_COLSPAN, MAX_ROWSPAN, RowStyle, RuleCell, TableCellSpec, TableData, VAlign,
};
use quire_markup::Attributes;

use super::{
    Tag, TreeBuilder, align_attr, color_attr, count_attr, length_attr, pixels_attr, valign_attr,
};
use crate::error::BuildError;

/// Size percentages of `<h1>` to `<h3>`.
const HEADING_SIZES: [u32; 3] = [200, 150, 117];

/// Thickness of a rule without a `size` attribute.
const DEFAULT_RULE_SIZE: i32 = 2;

/// Largest `<ol start>` honoured.
const MAX_LIST_START: i32 = 1_000_000_000;

/// An open `<table>`.
#[derive(Debug, Clone, Copy)]
pub(super) struct TableFrame {
    /// The table container.
    table: CellId,
    /// Style of the row being filled, once a row has started.
    row: Option<RowStyle>,
    /// Vertical alignment of cells that do not set one.
    valign: VAlign,
    /// Tag of the cell being filled.
    cell: Option<Tag>,
}

/// An open `<ul>` or `<ol>`.
#[derive(Debug, Clone, Copy)]
pub(super) struct ListFrame {
    /// The list container.
    list: CellId,
    /// Container the list was opened in.
    parent: CellId,
}

/// Container settings shared by the block elements.
fn block_data(attrs: &Attributes, top: i32) -> ContainerData {
    let mut data = ContainerData::default();
    if let Some(align) = align_attr(attrs, "align") {
        data.align_h = align;
    }
    if let Some(width) = length_attr(attrs, "width") {
        data.width = width;
    }
    data.indent = Indents {
        left: length_attr(attrs, "margin_left").unwrap_or_default(),
        right: length_attr(attrs, "margin_right").unwrap_or_default(),
        top: length_attr(attrs, "margin_top").unwrap_or(Length::Pixels(top)),
        bottom: length_attr(attrs, "margin_bottom").unwrap_or_default(),
    };
    if let Some(indent) = pixels_attr(attrs, "text_indent") {
        data.text_indent = indent;
    }
    data
}

impl TreeBuilder<'_> {
    /// `<p>`, `<div>`, `<dl>` and `<dt>`. Paragraph-like blocks get the
    /// configured spacing above them.
    pub(super) fn open_paragraph(
        &mut self,
        tag: Tag,
        attrs: &Attributes,
        spaced: bool,
    ) -> Result<(), BuildError> {
        let top = if spaced {
            self.ctx.config.paragraph_spacing
        } else {
            0
        };
        self.open_block(tag, block_data(attrs, top))
    }

    pub(super) fn open_definition(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        let mut data = block_data(attrs, 0);
        if !attrs.contains_key("margin_left") {
            data.indent.left = Length::Pixels(self.ctx.config.block_indent);
        }
        self.open_block(Tag::Dd, data)
    }

    pub(super) fn open_heading(&mut self, tag: Tag, attrs: &Attributes) -> Result<(), BuildError> {
        let size = match tag {
            Tag::H1 => HEADING_SIZES[0],
            Tag::H2 => HEADING_SIZES[1],
            _ => HEADING_SIZES[2],
        };
        self.open_block(tag, block_data(attrs, self.ctx.config.paragraph_spacing))?;
        self.fonts.push_with(|f| {
            f.bold = true;
            f.size_percent = size;
        });
        Ok(())
    }

    /// `<hr>` sits in a paragraph of its own.
    pub(super) fn horizontal_rule(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        let spacing = self.ctx.config.paragraph_spacing / 2;
        let mut data = ContainerData {
            align_h: align_attr(attrs, "align").unwrap_or(HAlign::Center),
            ..ContainerData::default()
        };
        data.indent.top = Length::Pixels(spacing);
        data.indent.bottom = Length::Pixels(spacing);
        let _ = self.open_container(Tag::Hr, data)?;
        let size = pixels_attr(attrs, "size").unwrap_or(DEFAULT_RULE_SIZE).max(1);
        let rule = RuleCell {
            width: length_attr(attrs, "width").unwrap_or(Length::FULL),
            size,
            solid: attrs.contains_key("noshade"),
        };
        let _ = self.push_inline(Cell::sized(CellKind::Rule(rule), 0, size), None);
        self.close_container(Tag::Hr)
    }

    /// `<img>`. Declared dimensions win over the natural size; an image that
    /// cannot be loaded becomes a fixed-size placeholder.
    pub(super) fn image(&mut self, attrs: &Attributes) {
        let src = attrs
            .get("src")
            .map(|src| self.resolve(src))
            .unwrap_or_default();
        let natural = if src.is_empty() {
            None
        } else {
            self.images.load(self.opener, &src)
        };
        let (width, height) = match natural {
            Some((width, height)) => (
                pixels_attr(attrs, "width").unwrap_or(width).max(0),
                pixels_attr(attrs, "height").unwrap_or(height).max(0),
            ),
            None => {
                let size = self.ctx.config.broken_image_size;
                (size, size)
            }
        };
        let image = ImageCell {
            src,
            alt: attrs.get("alt").cloned().unwrap_or_default(),
            broken: natural.is_none(),
        };
        let _ = self.push_inline(Cell::sized(CellKind::Image(image), width, height), None);
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    /// `<table>` opens a paragraph that positions the table, then the table
    /// itself.
    pub(super) fn open_table(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        let wrapper = ContainerData {
            align_h: align_attr(attrs, "align").unwrap_or_default(),
            ..ContainerData::default()
        };
        let _ = self.open_container(Tag::Table, wrapper)?;

        let border = match attrs.get("border") {
            Some(value) if value.trim().is_empty() => 1,
            Some(_) => pixels_attr(attrs, "border").unwrap_or(1).max(0),
            None => 0,
        };
        let spacing = pixels_attr(attrs, "cellspacing")
            .unwrap_or(self.ctx.config.table_cell_spacing)
            .max(0);
        let padding = pixels_attr(attrs, "cellpadding")
            .unwrap_or(self.ctx.config.table_cell_padding)
            .max(0);
        let data = TableData::new(spacing, padding, border).with_width(length_attr(attrs, "width"));
        let table = self.tree.push_table(self.current, data);
        if let Some(background) = color_attr(attrs, "bgcolor")
            && let Some(container) = self.tree.container_mut(table)
        {
            container.background = Some(background);
        }
        self.tables.push(TableFrame {
            table,
            row: None,
            valign: valign_attr(attrs, "valign").unwrap_or_default(),
            cell: None,
        });
        self.set_container(table);
        Ok(())
    }

    pub(super) fn close_table(&mut self) -> Result<(), BuildError> {
        let frame = self
            .tables
            .pop()
            .ok_or_else(|| BuildError::TableMarkupOutsideTable(Tag::Table.to_string()))?;
        // Back to the positioning paragraph, then out of it.
        if let Some(wrapper) = self.tree.parent(frame.table) {
            self.set_container(wrapper);
        }
        self.close_container(Tag::Table)
    }

    /// The innermost table, if the current container is that table.
    fn table_frame(&mut self, tag: Tag) -> Result<&mut TableFrame, BuildError> {
        let current = self.current;
        self.tables
            .last_mut()
            .filter(|frame| frame.table == current)
            .ok_or_else(|| BuildError::TableMarkupOutsideTable(tag.to_string()))
    }

    pub(super) fn open_row(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        let style = RowStyle {
            align_h: align_attr(attrs, "align"),
            align_v: valign_attr(attrs, "valign"),
            background: color_attr(attrs, "bgcolor"),
        };
        let frame = self.table_frame(Tag::Tr)?;
        frame.row = Some(style);
        let table = frame.table;
        self.tree.start_table_row(table, style);
        Ok(())
    }

    pub(super) fn close_row(&mut self) -> Result<(), BuildError> {
        let frame = self.table_frame(Tag::Tr)?;
        frame.row = None;
        Ok(())
    }

    /// `<td>` and `<th>`. A cell outside any `<tr>` starts a row.
    pub(super) fn open_table_cell(&mut self, tag: Tag, attrs: &Attributes) -> Result<(), BuildError> {
        let frame = *self.table_frame(tag)?;
        let row = match frame.row {
            Some(row) => row,
            None => {
                self.tree.start_table_row(frame.table, RowStyle::default());
                RowStyle::default()
            }
        };
        let header = tag == Tag::Th;
        let default_align = if header { HAlign::Center } else { HAlign::Left };
        let spec = TableCellSpec {
            colspan: count_attr(attrs, "colspan", MAX_COLSPAN).unwrap_or(1),
            rowspan: count_attr(attrs, "rowspan", MAX_ROWSPAN).unwrap_or(1),
            width: length_attr(attrs, "width"),
            align_h: align_attr(attrs, "align")
                .or(row.align_h)
                .unwrap_or(default_align),
            align_v: valign_attr(attrs, "valign")
                .or(row.align_v)
                .unwrap_or(frame.valign),
            background: color_attr(attrs, "bgcolor").or(row.background),
            nowrap: attrs.contains_key("nowrap"),
        };
        let content = self
            .tree
            .push_table_cell(frame.table, &spec)
            .ok_or_else(|| BuildError::TableMarkupOutsideTable(tag.to_string()))?;
        if let Some(open) = self.tables.last_mut() {
            open.row = Some(row);
            open.cell = Some(tag);
        }
        self.set_container(content);
        if header {
            self.fonts.push_with(|f| f.bold = true);
        }
        Ok(())
    }

    pub(super) fn close_table_cell(&mut self, tag: Tag) -> Result<(), BuildError> {
        let Some(frame) = self.tables.last_mut() else {
            return Err(BuildError::TableMarkupOutsideTable(tag.to_string()));
        };
        if frame.cell != Some(tag) {
            return Err(BuildError::TableMarkupOutsideTable(tag.to_string()));
        }
        frame.cell = None;
        let table = frame.table;
        if tag == Tag::Th {
            let _ = self.fonts.pop(tag)?;
        }
        self.set_container(table);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    pub(super) fn open_list(&mut self, tag: Tag, attrs: &Attributes) -> Result<(), BuildError> {
        if self.in_grid() {
            return Err(BuildError::MisplacedContent(tag.to_string()));
        }
        let ordered = tag == Tag::Ol;
        let start = count_attr(attrs, "start", MAX_LIST_START as usize).map_or(1, |n| n as i32);
        let data = ListData::new(ordered, start, self.ctx.config.list_marker_gap);
        let parent = self.current;
        let list = self.tree.push_list(parent, data);
        if let Some(container) = self.tree.container_mut(list) {
            container.indent.top = Length::Pixels(self.ctx.config.paragraph_spacing / 2);
        }
        self.lists.push(ListFrame { list, parent });
        self.set_container(list);
        Ok(())
    }

    pub(super) fn close_list(&mut self) -> Result<(), BuildError> {
        let frame = self.lists.pop().ok_or(BuildError::ListItemOutsideList)?;
        self.set_container(frame.parent);
        Ok(())
    }

    /// `<li>` fills the marker container, then continues in the content
    /// container.
    pub(super) fn open_list_item(&mut self) -> Result<(), BuildError> {
        let list = self
            .lists
            .last()
            .filter(|frame| frame.list == self.current)
            .map(|frame| frame.list)
            .ok_or(BuildError::ListItemOutsideList)?;
        let item = self
            .tree
            .push_list_item(list)
            .ok_or(BuildError::ListItemOutsideList)?;
        let marker = self
            .tree
            .container_mut(list)
            .and_then(ContainerData::list_mut)
            .map(ListData::next_marker)
            .unwrap_or_default();
        self.set_container(item.marker);
        self.add_text(&marker);
        self.emit_word();
        self.set_container(item.content);
        Ok(())
    }

    pub(super) fn close_list_item(&mut self) -> Result<(), BuildError> {
        let list = self
            .lists
            .last()
            .map(|frame| frame.list)
            .ok_or(BuildError::ListItemOutsideList)?;
        self.set_container(list);
        Ok(())
    }
}
