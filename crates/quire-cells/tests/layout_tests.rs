//! Integration tests for cell layout, traversal, painting and pagination.

use quickcheck_macros::quickcheck;
use quire_cells::layout::UNBOUNDED_WIDTH;
use quire_cells::{
    Cell, CellId, CellKind, CellTree, Color, ColorChange, ColorTarget, DisplayCommand,
    DisplayList, FindCondition, FontAttributes, HAlign, Length, LinkInfo, ListData,
    PositionMode, RenderConfig, RenderContext, RenderingInfo, RowStyle, Selection,
    SelectionPoint, TableCellSpec, TableData, VAlign,
};

/// Base size 10: every character is 6px wide, lines are 12px tall with a
/// descent of 3.
fn context() -> RenderContext {
    RenderContext::with_approximate_metrics(RenderConfig {
        base_font_size: 10.0,
        ..RenderConfig::default()
    })
}

fn add_text_with(
    tree: &mut CellTree,
    ctx: &mut RenderContext,
    parent: CellId,
    text: &str,
    attrs: &FontAttributes,
) -> Vec<CellId> {
    let font = ctx.realize(attrs);
    let space = ctx.measure(" ", font).width;
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let extent = ctx.measure(word, font);
            let trailing = if i + 1 < words.len() { space } else { 0 };
            tree.push(parent, Cell::word(*word, font, extent, trailing))
        })
        .collect()
}

fn add_text(tree: &mut CellTree, ctx: &mut RenderContext, parent: CellId, text: &str) -> Vec<CellId> {
    add_text_with(tree, ctx, parent, text, &FontAttributes::default())
}

fn paragraph(tree: &mut CellTree, ctx: &mut RenderContext, text: &str) -> (CellId, Vec<CellId>) {
    let block = tree.push_block(CellId::ROOT);
    let words = add_text(tree, ctx, block, text);
    (block, words)
}

// ---------------------------------------------------------------------------
// Flow layout
// ---------------------------------------------------------------------------

#[test]
fn test_justify_distributes_slack_over_gaps() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    if let Some(data) = tree.container_mut(CellId::ROOT) {
        data.align_h = HAlign::Justify;
    }
    let words = add_text(
        &mut tree,
        &mut ctx,
        CellId::ROOT,
        "aaaaaaaaaaaa bbbbbbbbbbbb cccccccccccc",
    );
    tree.layout(CellId::ROOT, 200);

    // The first line holds 150px of text; the single gap takes the other 50.
    assert_eq!(tree[words[0]].rect.x, 0);
    assert_eq!(tree[words[1]].rect.x, 128);
    assert_eq!(tree[words[1]].rect.right() - 6, 200);
    // The last line is not stretched.
    assert_eq!(tree[words[2]].rect.x, 0);
    assert_eq!(tree[words[2]].rect.y, 12);
}

#[test]
fn test_line_break_cell_ends_line_without_justifying() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    if let Some(data) = tree.container_mut(CellId::ROOT) {
        data.align_h = HAlign::Justify;
    }
    let first = add_text(&mut tree, &mut ctx, CellId::ROOT, "aa bb");
    let mut br = Cell::sized(CellKind::LineBreak { page_break: false }, 0, 12);
    br.descent = 3;
    let _ = tree.push(CellId::ROOT, br);
    let second = add_text(&mut tree, &mut ctx, CellId::ROOT, "cc");
    tree.layout(CellId::ROOT, 200);

    assert_eq!(tree[first[1]].rect.x, 18);
    assert_eq!(tree[second[0]].rect.y, 12);
    assert_eq!(tree[CellId::ROOT].rect.height, 24);
}

#[test]
fn test_centered_line_ignores_trailing_space() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    if let Some(data) = tree.container_mut(CellId::ROOT) {
        data.align_h = HAlign::Center;
    }
    let words = add_text(&mut tree, &mut ctx, CellId::ROOT, "abcd efgh");
    tree.layout(CellId::ROOT, 100);
    // 54px of text leaves 46px, split evenly.
    assert_eq!(tree[words[0]].rect.x, 23);
}

#[test]
fn test_baselines_align_across_font_sizes() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let small = add_text(&mut tree, &mut ctx, CellId::ROOT, "small ");
    let big = add_text_with(
        &mut tree,
        &mut ctx,
        CellId::ROOT,
        "big",
        &FontAttributes {
            size_percent: 200,
            ..FontAttributes::default()
        },
    );
    tree.layout(CellId::ROOT, 300);
    let small = &tree[small[0]];
    let big = &tree[big[0]];
    assert_eq!(small.rect.y + small.ascent(), big.rect.y + big.ascent());
    assert_eq!(tree[CellId::ROOT].rect.height, 24);
}

#[test]
fn test_superscript_raises_cell_and_grows_line() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let base = add_text(&mut tree, &mut ctx, CellId::ROOT, "x");
    let sup = add_text(&mut tree, &mut ctx, CellId::ROOT, "2");
    tree[sup[0]].script_baseline = -4;
    tree[sup[0]].break_before = false;
    tree.layout(CellId::ROOT, 300);
    assert_eq!(tree[sup[0]].rect.y + 4, tree[base[0]].rect.y);
    assert_eq!(tree[CellId::ROOT].rect.height, 16);
}

#[test]
fn test_min_height_pads_with_vertical_alignment() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let (block, words) = paragraph(&mut tree, &mut ctx, "word");
    if let Some(data) = tree.container_mut(block) {
        data.set_min_height(40, VAlign::Bottom);
    }
    tree.layout(CellId::ROOT, 300);
    assert_eq!(tree[block].rect.height, 40);
    assert_eq!(tree[words[0]].rect.y, 28);
}

#[test]
fn test_indents_and_percent_width() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let (block, words) = paragraph(&mut tree, &mut ctx, "indented");
    if let Some(data) = tree.container_mut(block) {
        data.width = Length::Percent(50);
        data.indent.left = Length::Pixels(10);
        data.indent.top = Length::Pixels(4);
    }
    tree.layout(CellId::ROOT, 300);
    assert_eq!(tree[block].rect.width, 150);
    assert_eq!((tree[words[0]].rect.x, tree[words[0]].rect.y), (10, 4));
}

#[test]
fn test_zero_width_layout_is_degenerate() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let (block, words) = paragraph(&mut tree, &mut ctx, "some words here");
    tree.layout(CellId::ROOT, 300);
    assert_ne!(tree[words[1]].rect.x, 0);

    tree.layout(CellId::ROOT, 0);
    assert_eq!(tree[CellId::ROOT].rect.width, 0);
    assert_eq!(tree[block].rect.width, 0);
    for id in words.iter().copied().chain([block]) {
        assert_eq!((tree[id].rect.x, tree[id].rect.y), (0, 0));
    }

    tree.layout(CellId::ROOT, 300);
    assert_eq!(tree[words[1]].rect.x, 30);
}

fn mixed_tree() -> CellTree {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let _ = paragraph(
        &mut tree,
        &mut ctx,
        "the quick brown fox jumps over the lazy dog again and again",
    );
    let table = tree.push_table(CellId::ROOT, TableData::new(2, 1, 1));
    tree.start_table_row(table, RowStyle::default());
    for text in ["left column text", "right", "third cell with words"] {
        if let Some(content) = tree.push_table_cell(table, &TableCellSpec::default()) {
            let _ = add_text(&mut tree, &mut ctx, content, text);
        }
    }
    let list = tree.push_list(CellId::ROOT, ListData::new(true, 1, 6));
    if let Some(item) = tree.push_list_item(list) {
        let _ = add_text(&mut tree, &mut ctx, item.marker, "1.");
        let _ = add_text(&mut tree, &mut ctx, item.content, "an item that wraps around");
    }
    tree
}

#[test]
fn test_relayout_reproduces_geometry() {
    let mut tree = mixed_tree();
    tree.layout(CellId::ROOT, 300);
    let first = tree.dump(CellId::ROOT);
    tree.layout(CellId::ROOT, 450);
    assert_ne!(tree.dump(CellId::ROOT), first);
    tree.layout(CellId::ROOT, 300);
    assert_eq!(tree.dump(CellId::ROOT), first);
}

#[quickcheck]
fn prop_layout_is_idempotent(a: u16, b: u16) -> bool {
    let a = i32::from(a % 1000) + 1;
    let b = i32::from(b % 1000) + 1;
    let mut tree = mixed_tree();
    tree.layout(CellId::ROOT, a);
    let first = tree.dump(CellId::ROOT);
    tree.layout(CellId::ROOT, b);
    tree.layout(CellId::ROOT, a);
    tree.dump(CellId::ROOT) == first && tree[CellId::ROOT].rect.width >= a
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[test]
fn test_table_column_never_below_minimum() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let table = tree.push_table(
        CellId::ROOT,
        TableData::new(2, 0, 0).with_width(Some(Length::Pixels(50))),
    );
    tree.start_table_row(table, RowStyle::default());
    let content = tree
        .push_table_cell(
            table,
            &TableCellSpec {
                width: Some(Length::Pixels(20)),
                ..TableCellSpec::default()
            },
        )
        .unwrap();
    let _ = add_text(&mut tree, &mut ctx, content, "aaaaaaaaaa");
    tree.layout(CellId::ROOT, 400);

    let columns = &tree.container(table).unwrap().table().unwrap().columns;
    assert_eq!(columns[0].min_width, 60);
    assert_eq!(columns[0].width, 60);
    assert_eq!(tree[table].rect.width, 64);
    assert_eq!((tree[content].rect.x, tree[content].rect.y), (2, 2));
}

#[test]
fn test_auto_table_shrinks_to_content() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let table = tree.push_table(CellId::ROOT, TableData::new(0, 0, 0));
    tree.start_table_row(table, RowStyle::default());
    for text in ["ab", "abcd"] {
        let content = tree.push_table_cell(table, &TableCellSpec::default()).unwrap();
        let _ = add_text(&mut tree, &mut ctx, content, text);
    }
    tree.layout(CellId::ROOT, 400);
    assert_eq!(tree[table].rect.width, 36);
}

#[test]
fn test_table_remeasures_after_cell_content_changes() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let table = tree.push_table(CellId::ROOT, TableData::new(0, 0, 0));
    tree.start_table_row(table, RowStyle::default());
    let content = tree.push_table_cell(table, &TableCellSpec::default()).unwrap();
    let first = add_text(&mut tree, &mut ctx, content, "ab");
    tree.layout(CellId::ROOT, 400);
    assert_eq!(tree[table].rect.width, 12);

    let second = add_text(&mut tree, &mut ctx, content, "abcdefgh");
    tree.layout(CellId::ROOT, 400);
    let columns = &tree.container(table).unwrap().table().unwrap().columns;
    assert_eq!(columns[0].max_width, 60);
    assert_eq!(tree[table].rect.width, 60);
    assert_eq!(tree[first[0]].rect.y, tree[second[0]].rect.y);
}

#[test]
fn test_rowspan_cell_stretches_over_rows() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let table = tree.push_table(CellId::ROOT, TableData::new(0, 0, 0));
    tree.start_table_row(table, RowStyle::default());
    let tall = tree
        .push_table_cell(
            table,
            &TableCellSpec {
                rowspan: 2,
                ..TableCellSpec::default()
            },
        )
        .unwrap();
    let _ = add_text(&mut tree, &mut ctx, tall, "a");
    let top = tree.push_table_cell(table, &TableCellSpec::default()).unwrap();
    let _ = add_text(&mut tree, &mut ctx, top, "b");
    tree.start_table_row(table, RowStyle::default());
    let bottom = tree.push_table_cell(table, &TableCellSpec::default()).unwrap();
    let _ = add_text(&mut tree, &mut ctx, bottom, "c");
    tree.layout(CellId::ROOT, 400);

    assert_eq!(tree[tall].rect.height, 24);
    assert_eq!(tree[bottom].rect.y, 12);
    assert_eq!(tree[bottom].rect.x, tree[top].rect.x);
    assert_eq!(tree[table].rect.height, 24);
}

#[test]
fn test_full_percent_table_is_unbounded() {
    let mut tree = CellTree::new();
    let table = tree.push_table(
        CellId::ROOT,
        TableData::new(0, 0, 0).with_width(Some(Length::Pixels(400))),
    );
    tree.start_table_row(table, RowStyle::default());
    for percent in [60, 40] {
        let _ = tree.push_table_cell(
            table,
            &TableCellSpec {
                width: Some(Length::Percent(percent)),
                ..TableCellSpec::default()
            },
        );
    }
    tree.layout(CellId::ROOT, 400);
    assert_eq!(
        tree.container(table).map(|d| d.max_total_width),
        Some(UNBOUNDED_WIDTH)
    );
    let columns = &tree.container(table).unwrap().table().unwrap().columns;
    assert_eq!((columns[0].width, columns[1].width), (240, 160));
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[test]
fn test_list_marker_baseline_matches_item() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let list = tree.push_list(CellId::ROOT, ListData::new(false, 1, 6));
    let item = tree.push_list_item(list).unwrap();
    let marker = add_text(&mut tree, &mut ctx, item.marker, "\u{2022}");
    let content = add_text_with(
        &mut tree,
        &mut ctx,
        item.content,
        "Big",
        &FontAttributes {
            size_percent: 200,
            ..FontAttributes::default()
        },
    );
    tree.layout(CellId::ROOT, 300);

    let marker_baseline = tree.absolute_position(marker[0]).1 + tree[marker[0]].ascent();
    let content_baseline = tree.absolute_position(content[0]).1 + tree[content[0]].ascent();
    assert_eq!(marker_baseline, content_baseline);
    assert_eq!(tree[item.content].rect.x, 12);
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

#[test]
fn test_find_anchor_and_link() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let (_, words) = paragraph(&mut tree, &mut ctx, "Hello world");
    tree[words[1]].link = Some(LinkInfo::new("page.html"));
    let (second, _) = paragraph(&mut tree, &mut ctx, "next");
    let anchor = tree.push(second, Cell::new(CellKind::Anchor("sec".into())));

    assert_eq!(tree.find(CellId::ROOT, FindCondition::Anchor("sec")), Some(anchor));
    assert_eq!(tree.find(CellId::ROOT, FindCondition::Link("page.html")), Some(words[1]));
    assert_eq!(tree.find(CellId::ROOT, FindCondition::Anchor("missing")), None);
}

#[test]
fn test_find_cell_by_position() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let (_, first) = paragraph(&mut tree, &mut ctx, "Hello world");
    let (_, second) = paragraph(&mut tree, &mut ctx, "next");
    tree[first[1]].link = Some(LinkInfo::new("page.html"));
    tree.layout(CellId::ROOT, 300);

    assert_eq!(tree.find_cell_by_pos(CellId::ROOT, 40, 5, PositionMode::Exact), Some(first[1]));
    assert_eq!(tree.find_cell_by_pos(CellId::ROOT, 200, 5, PositionMode::Exact), None);
    assert_eq!(
        tree.find_cell_by_pos(CellId::ROOT, 200, 5, PositionMode::NearestBefore),
        Some(first[1])
    );
    assert_eq!(
        tree.find_cell_by_pos(CellId::ROOT, 200, 5, PositionMode::NearestAfter),
        Some(second[0])
    );
    assert_eq!(
        tree.link_at(CellId::ROOT, 40, 5).map(|l| l.href.as_str()),
        Some("page.html")
    );
    assert!(tree.link_at(CellId::ROOT, 2, 5).is_none());
}

#[test]
fn test_terminals_in_reading_order() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let (_, first) = paragraph(&mut tree, &mut ctx, "one two");
    let _empty = tree.push_block(CellId::ROOT);
    let (third, last) = paragraph(&mut tree, &mut ctx, "three");
    let all: Vec<CellId> = tree.terminals(CellId::ROOT).collect();
    assert_eq!(all, vec![first[0], first[1], last[0]]);
    assert_eq!(tree.next_terminal(first[1]), Some(last[0]));
    assert_eq!(tree.terminals(third).collect::<Vec<_>>(), last);
}

// ---------------------------------------------------------------------------
// Painting and selection
// ---------------------------------------------------------------------------

#[test]
fn test_invisible_cells_still_change_colour() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let first = tree.push_block(CellId::ROOT);
    let red = Color::rgb(255, 0, 0);
    let _ = tree.push(
        first,
        Cell::new(CellKind::Color(ColorChange {
            target: ColorTarget::Foreground,
            color: red,
        })),
    );
    let _ = add_text(&mut tree, &mut ctx, first, "first");
    let _ = paragraph(&mut tree, &mut ctx, "second");
    tree.layout(CellId::ROOT, 300);

    let mut list = DisplayList::new();
    let mut info = RenderingInfo::new(&ctx.config);
    tree.draw(CellId::ROOT, &ctx, &mut list, (0, 0), &(12..24), &mut info);

    assert_eq!(list.texts().collect::<Vec<_>>(), vec!["second"]);
    let color = list.commands().iter().find_map(|c| match c {
        DisplayCommand::DrawText { color, .. } => Some(*color),
        _ => None,
    });
    assert_eq!(color, Some(red));
}

#[test]
fn test_selection_is_highlighted() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let (_, words) = paragraph(&mut tree, &mut ctx, "Hello world again");
    tree.layout(CellId::ROOT, 300);

    let selection = Selection::new(SelectionPoint::at(words[0], 3), SelectionPoint::cell(words[1]));
    let mut list = DisplayList::new();
    let mut info = RenderingInfo::new(&ctx.config).with_selection(selection);
    tree.draw(CellId::ROOT, &ctx, &mut list, (0, 0), &(0..100), &mut info);

    assert_eq!(
        list.texts().collect::<Vec<_>>(),
        vec!["Hel", "lo", "world", "again"]
    );
    let highlights = list
        .commands()
        .iter()
        .filter(|c| {
            matches!(c, DisplayCommand::FillRect { color, .. } if *color == ctx.config.selection_background)
        })
        .count();
    assert_eq!(highlights, 2);
    assert!(!info.is_selecting());
}

#[test]
fn test_selection_text_spans_paragraphs() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let (_, first) = paragraph(&mut tree, &mut ctx, "Hello brave world");
    let (_, second) = paragraph(&mut tree, &mut ctx, "Second line");
    let selection = Selection::new(SelectionPoint::at(first[0], 1), SelectionPoint::at(second[1], 2));
    assert_eq!(tree.selection_text(&selection), "ello brave world\nSecond li");
    assert_eq!(tree.document_text(CellId::ROOT), "Hello brave world\nSecond line");
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[test]
fn test_page_breaks_avoid_cutting_lines() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    for _ in 0..10 {
        let _ = paragraph(&mut tree, &mut ctx, "line");
    }
    tree.layout(CellId::ROOT, 300);
    assert_eq!(tree.page_breaks(CellId::ROOT, 50), vec![48, 96, 120]);
}

#[test]
fn test_forced_page_break() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let mut blocks = Vec::new();
    for _ in 0..10 {
        blocks.push(paragraph(&mut tree, &mut ctx, "line").0);
    }
    let mut page = Cell::sized(CellKind::LineBreak { page_break: true }, 0, 12);
    page.descent = 3;
    let _ = tree.push(blocks[2], page);
    tree.layout(CellId::ROOT, 300);
    assert_eq!(tree.page_breaks(CellId::ROOT, 100), vec![36, 120]);
}

#[test]
fn test_dump_outline() {
    let mut ctx = context();
    let mut tree = CellTree::new();
    let _ = paragraph(&mut tree, &mut ctx, "hi");
    tree.layout(CellId::ROOT, 100);
    let outline = tree.dump(CellId::ROOT).unwrap().to_outline();
    assert_eq!(
        outline,
        "container (0, 0) 100x12\n  container (0, 0) 100x12\n    word (0, 0) 12x12 \"hi\"\n"
    );
}
