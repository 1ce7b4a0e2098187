//! Table layout.
//!
//! A table is a container whose children are the containers of its cells.
//! Cells are placed on a grid of slots as they arrive; row and column spans
//! mark the slots they cover. Column widths come from the narrowest and
//! widest each column's cells can be laid out at, the declared widths and
//! the width available to the table.

use super::{NARROW_WIDTH, UNBOUNDED_WIDTH, layout_cell};
use crate::cell::CellId;
use crate::container::{Border, ContainerData, ContainerKind};
use crate::geometry::{Color, HAlign, Indents, Length, VAlign, percent_of};
use crate::tree::CellTree;

/// Widest `colspan` honoured; wider spans are clamped.
pub const MAX_COLSPAN: usize = 1000;

/// Tallest `rowspan` honoured. A span never adds rows of its own: it covers
/// at most the rows the table goes on to start.
pub const MAX_ROWSPAN: usize = 65534;

/// Occupancy of one grid position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing placed here yet.
    #[default]
    Free,
    /// A cell starts here.
    Used,
    /// Covered by the span of a cell starting elsewhere.
    Spanned,
}

/// One grid position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot {
    /// Occupancy.
    pub state: SlotState,
    /// Content container of the cell starting here.
    pub content: Option<CellId>,
    /// Columns covered by that cell.
    pub colspan: usize,
    /// Rows covered by that cell.
    pub rowspan: usize,
}

/// Width bookkeeping of one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Column {
    /// Width declared by the first single-column cell that named one.
    pub declared: Option<Length>,
    /// Narrowest width the column's content allows.
    pub min_width: i32,
    /// Width the column's content takes without any line breaks.
    pub max_width: i32,
    /// Width assigned by the last layout.
    pub width: i32,
    /// Left edge assigned by the last layout.
    pub left: i32,
}

/// Defaults a row hands to its cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowStyle {
    /// Horizontal alignment.
    pub align_h: Option<HAlign>,
    /// Vertical alignment.
    pub align_v: Option<VAlign>,
    /// Background.
    pub background: Option<Color>,
}

/// Attributes of a cell being added to a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCellSpec {
    /// Columns spanned; zero counts as one, clamped to [`MAX_COLSPAN`].
    pub colspan: usize,
    /// Rows spanned; zero counts as one, clamped to [`MAX_ROWSPAN`].
    pub rowspan: usize,
    /// Declared width.
    pub width: Option<Length>,
    /// Horizontal alignment of the content.
    pub align_h: HAlign,
    /// Vertical alignment of the content.
    pub align_v: VAlign,
    /// Background.
    pub background: Option<Color>,
    /// Never break lines in this cell.
    pub nowrap: bool,
}

/// Table payload of a container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    /// Declared table width; `None` sizes the table to its content.
    pub width: Option<Length>,
    /// Space between cells and around the grid.
    pub spacing: i32,
    /// Padding inside every cell.
    pub padding: i32,
    /// Border width; zero for none.
    pub border: i32,
    /// Style of the row being filled.
    pub row_style: RowStyle,
    /// Slots, row by row. Every row has one slot per column.
    pub grid: Vec<Vec<Slot>>,
    /// Columns.
    pub columns: Vec<Column>,
    /// Top of every row after the last layout, plus the bottom edge.
    pub row_offsets: Vec<i32>,
    /// Per column, the row below the lowest row a span still covers.
    span_ends: Vec<usize>,
    current_row: Option<usize>,
    measured: bool,
}

impl TableData {
    /// An empty table.
    #[must_use]
    pub fn new(spacing: i32, padding: i32, border: i32) -> Self {
        Self {
            spacing,
            padding,
            border,
            ..Self::default()
        }
    }

    /// Set the declared table width.
    #[must_use]
    pub fn with_width(mut self, width: Option<Length>) -> Self {
        self.width = width;
        self
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    /// The slot at `(row, column)`.
    #[must_use]
    pub fn slot(&self, row: usize, column: usize) -> Option<&Slot> {
        self.grid.get(row).and_then(|r| r.get(column))
    }

    /// Begin the next row.
    pub fn start_row(&mut self, style: RowStyle) {
        let row = self.current_row.map_or(0, |r| r + 1);
        self.current_row = Some(row);
        self.row_style = style;
        self.ensure_rows(row + 1);
    }

    /// Sum of the declared column percentages.
    #[must_use]
    pub fn percent_total(&self) -> i32 {
        self.columns
            .iter()
            .filter_map(|c| match c.declared {
                Some(Length::Percent(p)) => Some(p),
                _ => None,
            })
            .sum()
    }

    /// Forget the column measurements so the next layout measures again.
    pub(crate) fn invalidate_measure(&mut self) {
        self.measured = false;
    }

    /// Grow the grid to `rows` rows. New rows start covered wherever a span
    /// from above still reaches.
    fn ensure_rows(&mut self, rows: usize) {
        while self.grid.len() < rows {
            let index = self.grid.len();
            let row = self
                .span_ends
                .iter()
                .map(|&end| Slot {
                    state: if end > index {
                        SlotState::Spanned
                    } else {
                        SlotState::Free
                    },
                    ..Slot::default()
                })
                .collect();
            self.grid.push(row);
        }
    }

    fn ensure_columns(&mut self, columns: usize) {
        if self.columns.len() < columns {
            self.columns.resize(columns, Column::default());
            self.span_ends.resize(columns, 0);
            for row in &mut self.grid {
                row.resize(columns, Slot::default());
            }
        }
    }

    /// Place `content` in the first free slot of the current row.
    fn place(&mut self, content: CellId, spec: &TableCellSpec) -> (usize, usize) {
        let row = match self.current_row {
            Some(row) => row,
            None => {
                self.start_row(RowStyle::default());
                0
            }
        };
        self.ensure_rows(row + 1);
        let column = self.grid[row]
            .iter()
            .position(|slot| slot.state == SlotState::Free)
            .unwrap_or(self.columns.len());
        let colspan = spec.colspan.clamp(1, MAX_COLSPAN);
        let rowspan = spec.rowspan.clamp(1, MAX_ROWSPAN);
        self.ensure_columns(column + colspan);

        let last_row = (row + rowspan).min(self.grid.len());
        for r in row..last_row {
            for slot in &mut self.grid[r][column..column + colspan] {
                if slot.state == SlotState::Free {
                    slot.state = SlotState::Spanned;
                }
            }
        }
        for end in &mut self.span_ends[column..column + colspan] {
            *end = (*end).max(row + rowspan);
        }
        self.grid[row][column] = Slot {
            state: SlotState::Used,
            content: Some(content),
            colspan,
            rowspan,
        };
        if colspan == 1 && self.columns[column].declared.is_none() {
            self.columns[column].declared = spec.width;
        }
        self.measured = false;
        (row, column)
    }

    /// Every used slot as `(row, column, slot)`.
    fn used_slots(&self) -> Vec<(usize, usize, Slot)> {
        self.grid
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, slot)| slot.state == SlotState::Used)
                    .map(move |(c, slot)| (r, c, *slot))
            })
            .collect()
    }
}

impl CellTree {
    /// Append a table container to `parent`.
    pub fn push_table(&mut self, parent: CellId, table: TableData) -> CellId {
        let border = (table.border > 0).then(|| Border::raised(table.border));
        let data = ContainerData {
            border,
            ..ContainerData::new(ContainerKind::Table(Box::new(table)))
        };
        self.push_container(parent, data)
    }

    /// Begin a new row in `table`.
    pub fn start_table_row(&mut self, table: CellId, style: RowStyle) {
        if let Some(data) = self.container_mut(table).and_then(ContainerData::table_mut) {
            data.start_row(style);
        }
    }

    /// Add a cell to the current row of `table` and return its content
    /// container, or `None` if `table` is not a table.
    pub fn push_table_cell(&mut self, table: CellId, spec: &TableCellSpec) -> Option<CellId> {
        let data = self.container(table)?.table()?;
        let padding = data.padding;
        let bordered = data.border > 0;
        let content = self.push_container(
            table,
            ContainerData {
                align_h: spec.align_h,
                align_v: spec.align_v,
                indent: Indents::uniform(padding),
                background: spec.background,
                border: bordered.then(|| Border::sunken(1)),
                nowrap: spec.nowrap,
                ..ContainerData::default()
            },
        );
        let data = self.container_mut(table)?.table_mut()?;
        let _ = data.place(content, spec);
        Some(content)
    }
}

/// Width of a span of columns, including the spacing between them.
fn span_width(columns: &[Column], first: usize, span: usize, spacing: i32) -> i32 {
    let covered = &columns[first..(first + span).min(columns.len())];
    covered.iter().map(|c| c.width).sum::<i32>() + spacing * (covered.len() as i32 - 1).max(0)
}

/// Share of `total` for one of `span` columns, rounded up.
const fn per_column(total: i32, span: usize, spacing: i32) -> i32 {
    let span = span as i32;
    let total = total - spacing * (span - 1);
    if total <= 0 {
        0
    } else {
        (total + span - 1) / span
    }
}

/// Record the narrowest and widest every column can get.
fn measure(tree: &mut CellTree, id: CellId) {
    let Some(table) = tree.container(id).and_then(ContainerData::table) else {
        return;
    };
    let slots = table.used_slots();
    let spacing = table.spacing;
    let mut columns = table.columns.clone();
    for column in &mut columns {
        column.min_width = 0;
        column.max_width = 0;
    }

    for (_, c, slot) in slots {
        let Some(content) = slot.content else {
            continue;
        };
        reset_min_height(tree, content);
        layout_cell(tree, content, NARROW_WIDTH);
        let min = tree[content].rect.width;
        let max = tree
            .container(content)
            .map_or(min, |d| d.max_total_width)
            .max(min);
        let per_min = per_column(min, slot.colspan, spacing);
        let per_max = per_column(max, slot.colspan, spacing);
        for column in columns.iter_mut().skip(c).take(slot.colspan) {
            column.min_width = column.min_width.max(per_min);
            column.max_width = column.max_width.max(per_max);
        }
    }

    if let Some(table) = tree.container_mut(id).and_then(ContainerData::table_mut) {
        table.columns = columns;
        table.measured = true;
    }
}

fn reset_min_height(tree: &mut CellTree, content: CellId) {
    if let Some(data) = tree.container_mut(content) {
        let align = data.align_v;
        data.set_min_height(0, align);
    }
}

/// Assign widths: fixed columns first, then percentages, then the rest in
/// proportion to their widest content. No column gets less than its minimum.
fn distribute(columns: &mut [Column], inner: i32) {
    let mut remaining = inner;
    let mut assigned = vec![false; columns.len()];

    for (i, column) in columns.iter_mut().enumerate() {
        if let Some(Length::Pixels(px)) = column.declared {
            if px > 0 {
                column.width = px.max(column.min_width);
                remaining -= column.width;
                assigned[i] = true;
            }
        }
    }

    for i in 0..columns.len() {
        let Some(Length::Percent(percent)) = columns[i].declared else {
            continue;
        };
        // Leave room for the minimum of every column still waiting.
        let reserve: i32 = (i + 1..columns.len())
            .filter(|&j| !assigned[j])
            .map(|j| columns[j].min_width)
            .sum();
        let wanted = percent_of(inner, percent).min(remaining - reserve);
        let column = &mut columns[i];
        column.width = wanted.max(column.min_width);
        remaining -= column.width;
        assigned[i] = true;
    }

    let auto: Vec<usize> = (0..columns.len()).filter(|&i| !assigned[i]).collect();
    if auto.is_empty() {
        return;
    }
    let total_max: i64 = auto.iter().map(|&i| i64::from(columns[i].max_width)).sum();
    let total_min: i32 = auto.iter().map(|&i| columns[i].min_width).sum();
    for &i in &auto {
        let column = &mut columns[i];
        let share = if remaining <= total_min {
            0
        } else if total_max == 0 {
            remaining / auto.len() as i32
        } else {
            (i64::from(remaining) * i64::from(column.max_width) / total_max) as i32
        };
        column.width = share.max(column.min_width);
    }
}

pub(super) fn layout_table(tree: &mut CellTree, id: CellId, available: i32) {
    let needs_measure = tree
        .container(id)
        .and_then(ContainerData::table)
        .is_some_and(|t| !t.measured);
    if needs_measure {
        measure(tree, id);
    }
    let Some(table) = tree.container(id).and_then(ContainerData::table) else {
        return;
    };
    let spacing = table.spacing;
    let declared = table.width;
    let percent_total = table.percent_total();
    let slots = table.used_slots();
    let rows = table.rows();
    let mut columns = table.columns.clone();

    // STEP 1: Decide the table width.
    let outer = spacing * (columns.len() as i32 + 1);
    let sum_min: i32 = columns.iter().map(|c| c.min_width).sum::<i32>() + outer;
    let sum_max = columns
        .iter()
        .fold(i64::from(outer), |sum, c| sum + i64::from(c.max_width))
        .min(i64::from(UNBOUNDED_WIDTH)) as i32;
    let target = match declared {
        Some(width) => width.resolve_width(available).clamp(0, UNBOUNDED_WIDTH),
        None => sum_max.min(available).max(sum_min),
    };

    // STEP 2: Column widths and left edges.
    distribute(&mut columns, target - outer);
    let mut left = spacing;
    for column in &mut columns {
        column.left = left;
        left += column.width + spacing;
    }
    let total_width = left;

    // STEP 3: Lay out every cell at its span width and grow the rows it
    // ends in.
    let mut offsets = vec![0; rows + 1];
    if let Some(first) = offsets.first_mut() {
        *first = spacing;
    }
    let mut slots_by_row: Vec<Vec<(usize, Slot)>> = vec![Vec::new(); rows];
    for &(r, c, slot) in &slots {
        slots_by_row[r].push((c, slot));
    }
    for (r, row_slots) in slots_by_row.iter().enumerate() {
        if r > 0 {
            offsets[r] = offsets[r].max(offsets[r - 1]);
        }
        for &(c, slot) in row_slots {
            let Some(content) = slot.content else {
                continue;
            };
            reset_min_height(tree, content);
            layout_cell(tree, content, span_width(&columns, c, slot.colspan, spacing));
            let bottom = offsets[r] + tree[content].rect.height + spacing;
            let end = (r + slot.rowspan).min(rows);
            offsets[end] = offsets[end].max(bottom);
        }
    }
    if rows > 0 {
        offsets[rows] = offsets[rows].max(offsets[rows - 1]);
    }

    // STEP 4: Stretch every cell to the rows it spans and place it.
    for &(r, c, slot) in &slots {
        let Some(content) = slot.content else {
            continue;
        };
        let end = (r + slot.rowspan).min(rows);
        let top = offsets[r];
        let height = offsets[end] - spacing - top;
        if height > tree[content].rect.height {
            if let Some(data) = tree.container_mut(content) {
                let align = data.align_v;
                data.set_min_height(height, align);
            }
            layout_cell(tree, content, span_width(&columns, c, slot.colspan, spacing));
        }
        let rect = &mut tree[content].rect;
        rect.x = columns[c].left;
        rect.y = top;
    }

    // STEP 5: Size the table.
    let width = target.max(total_width);
    let height = if rows == 0 { 0 } else { offsets[rows] };
    let max_total = if percent_total >= 100 {
        UNBOUNDED_WIDTH
    } else {
        match declared {
            Some(Length::Pixels(px)) if px > 0 => px.max(sum_min),
            _ => sum_max,
        }
    };
    let cell = &mut tree[id];
    cell.rect.width = width;
    cell.rect.height = height;
    if let Some(data) = cell.as_container_mut() {
        data.max_total_width = max_total;
        data.max_line_width = width;
        if let Some(table) = data.table_mut() {
            table.columns = columns;
            table.row_offsets = offsets;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> TableCellSpec {
        TableCellSpec::default()
    }

    #[test]
    fn test_spans_mark_slots() {
        let mut table = TableData::new(0, 0, 0);
        table.start_row(RowStyle::default());
        let _ = table.place(
            CellId(1),
            &TableCellSpec {
                colspan: 2,
                rowspan: 2,
                ..spec()
            },
        );
        let _ = table.place(CellId(2), &spec());
        table.start_row(RowStyle::default());
        // The second row's first free slot is after the spanned pair.
        assert_eq!(table.place(CellId(3), &spec()), (1, 2));
        assert_eq!(table.slot(1, 0).map(|s| s.state), Some(SlotState::Spanned));
        assert_eq!(table.slot(0, 1).map(|s| s.state), Some(SlotState::Spanned));
        assert_eq!(table.columns.len(), 3);
    }

    #[test]
    fn test_rowspan_never_adds_rows() {
        let mut table = TableData::new(0, 0, 0);
        table.start_row(RowStyle::default());
        let _ = table.place(
            CellId(1),
            &TableCellSpec {
                rowspan: usize::MAX,
                ..spec()
            },
        );
        assert_eq!(table.rows(), 1);
        assert_eq!(table.slot(0, 0).map(|s| s.rowspan), Some(MAX_ROWSPAN));

        // A row started later is still covered by the span.
        table.start_row(RowStyle::default());
        assert_eq!(table.rows(), 2);
        assert_eq!(table.place(CellId(2), &spec()), (1, 1));
    }

    #[test]
    fn test_colspan_is_clamped() {
        let mut table = TableData::new(0, 0, 0);
        table.start_row(RowStyle::default());
        let _ = table.place(
            CellId(1),
            &TableCellSpec {
                colspan: usize::MAX,
                ..spec()
            },
        );
        assert_eq!(table.columns.len(), MAX_COLSPAN);
        assert_eq!(table.slot(0, 0).map(|s| s.colspan), Some(MAX_COLSPAN));
    }

    #[test]
    fn test_distribute_percent_then_proportional() {
        let mut columns = vec![
            Column {
                declared: Some(Length::Percent(50)),
                min_width: 10,
                max_width: 10,
                ..Column::default()
            },
            Column {
                min_width: 10,
                max_width: 30,
                ..Column::default()
            },
            Column {
                min_width: 10,
                max_width: 10,
                ..Column::default()
            },
        ];
        distribute(&mut columns, 200);
        assert_eq!(columns[0].width, 100);
        assert_eq!(columns[1].width, 75);
        assert_eq!(columns[2].width, 25);
    }

    #[test]
    fn test_distribute_respects_minimum() {
        let mut columns = vec![Column {
            declared: Some(Length::Pixels(20)),
            min_width: 60,
            max_width: 60,
            ..Column::default()
        }];
        distribute(&mut columns, 20);
        assert_eq!(columns[0].width, 60);
    }

    #[test]
    fn test_per_column_share() {
        assert_eq!(per_column(10, 1, 2), 10);
        assert_eq!(per_column(12, 2, 2), 5);
        assert_eq!(per_column(1, 3, 2), 0);
    }
}
