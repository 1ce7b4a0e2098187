//! Integration tests for building, laying out and viewing documents.

use std::sync::Arc;

use quire_cells::{
    CellId, CellKind, Color, ColorChange, FindCondition, MAX_COLSPAN, MAX_LENGTH, MAX_ROWSPAN,
    RenderConfig, RenderContext, ScriptMode, TableData, WidgetKind,
};
use quire_document::{
    Document, DocumentError, DocumentView, FontSet, MemoryOpener, Method, Rasterizer,
};
use quire_markup::ParseErrorKind;

const DECL: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Base size 10: every character is 6px wide, lines are 12px tall with a
/// descent of 3.
fn context() -> RenderContext {
    RenderContext::with_approximate_metrics(RenderConfig {
        base_font_size: 10.0,
        ..RenderConfig::default()
    })
}

fn page(body: &str) -> String {
    format!("{DECL}<html><body>{body}</body></html>")
}

fn build_with(markup: &str, opener: &MemoryOpener, location: Option<&str>) -> Document {
    let mut ctx = context();
    let mut doc = Document::from_markup(markup.as_bytes(), &mut ctx, opener, location).unwrap();
    doc.layout(400);
    doc
}

fn build(body: &str) -> Document {
    build_with(&page(body), &MemoryOpener::new(), None)
}

fn build_error(body: &str) -> ParseErrorKind {
    let mut ctx = context();
    let err = Document::from_markup(page(body).as_bytes(), &mut ctx, &MemoryOpener::new(), None)
        .unwrap_err();
    err.parse_error().unwrap().kind.clone()
}

fn words(doc: &Document) -> Vec<(String, CellId)> {
    let tree = doc.tree();
    tree.terminals(doc.root())
        .filter_map(|id| tree[id].as_word().map(|word| (word.text.clone(), id)))
        .collect()
}

fn word_texts(doc: &Document) -> Vec<String> {
    words(doc).into_iter().map(|(text, _)| text).collect()
}

fn word_id(doc: &Document, text: &str) -> CellId {
    words(doc)
        .into_iter()
        .find(|(word, _)| word == text)
        .map(|(_, id)| id)
        .unwrap()
}

/// A 3x2 PNG encoded on the fly.
fn png() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 128, 0, 255]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

#[test]
fn test_hello_world_is_one_line() {
    let markup = format!("{DECL}<html><body><p>Hello <b>world</b>!</p></body></html>");
    let mut ctx = context();
    let mut doc =
        Document::from_markup(markup.as_bytes(), &mut ctx, &MemoryOpener::new(), None).unwrap();
    doc.layout(400);

    assert_eq!(word_texts(&doc), ["Hello", "world", "!"]);
    let tree = doc.tree();
    let bold: Vec<bool> = words(&doc)
        .iter()
        .map(|(_, id)| {
            let font = tree[*id].as_word().unwrap().font;
            ctx.font(font).unwrap().bold
        })
        .collect();
    assert_eq!(bold, [false, true, false]);

    let ys: Vec<i32> = words(&doc)
        .iter()
        .map(|(_, id)| tree.absolute_position(*id).1)
        .collect();
    assert!(ys.iter().all(|&y| y == ys[0]));
    assert_eq!(doc.text(), "Hello world!");
}

#[test]
fn test_tt_and_code_select_fixed_pitch() {
    let markup = page("<p>plain <tt>teletype</tt> <code>code <b>bold</b></code></p>");
    let mut ctx = context();
    let doc =
        Document::from_markup(markup.as_bytes(), &mut ctx, &MemoryOpener::new(), None).unwrap();
    let tree = doc.tree();
    let fixed: Vec<(String, bool, bool)> = words(&doc)
        .iter()
        .map(|(text, id)| {
            let font = ctx.font(tree[*id].as_word().unwrap().font).unwrap();
            (text.clone(), font.fixed, font.bold)
        })
        .collect();
    assert_eq!(
        fixed,
        [
            ("plain".to_string(), false, false),
            ("teletype".to_string(), true, false),
            ("code".to_string(), true, false),
            ("bold".to_string(), true, true),
        ]
    );
}

#[test]
fn test_unknown_tag_is_a_parse_error() {
    assert_eq!(
        build_error("<p>a <foobar>b</foobar></p>"),
        ParseErrorKind::UnknownStartTag("foobar".to_string())
    );
}

#[test]
fn test_markup_glues_words_without_whitespace() {
    let doc = build("<p>foo<i>bar</i> baz</p>");
    let tree = doc.tree();
    assert!(!tree[word_id(&doc, "bar")].break_before);
    assert!(tree[word_id(&doc, "baz")].break_before);
    assert_eq!(doc.text(), "foobar baz");
}

#[test]
fn test_title_and_head_text_produce_no_cells() {
    let markup = format!(
        "{DECL}<html><head><title>  My \n  Page </title><meta name=\"x\"/></head>\
         <body><p>Body</p></body></html>"
    );
    let doc = build_with(&markup, &MemoryOpener::new(), None);
    assert_eq!(doc.title(), Some("My Page"));
    assert_eq!(word_texts(&doc), ["Body"]);
}

#[test]
fn test_small_caps_shrink_lowercase_runs() {
    let markup = page("<p><sc>Hello</sc></p>");
    let mut ctx = context();
    let doc = Document::from_markup(markup.as_bytes(), &mut ctx, &MemoryOpener::new(), None)
        .unwrap();
    assert_eq!(word_texts(&doc), ["H", "ELLO"]);
    let tree = doc.tree();
    let size = |text: &str| {
        let font = tree[word_id(&doc, text)].as_word().unwrap().font;
        ctx.font(font).unwrap().size
    };
    assert!(size("ELLO") < size("H"));
    assert!(!tree[word_id(&doc, "ELLO")].break_before);
}

#[test]
fn test_superscript_is_raised() {
    let doc = build("<p>x<sup>2</sup> y<sub>i</sub></p>");
    let tree = doc.tree();
    let sup = &tree[word_id(&doc, "2")];
    assert_eq!(sup.script, ScriptMode::Superscript);
    assert!(sup.script_baseline < 0);
    let sub = &tree[word_id(&doc, "i")];
    assert_eq!(sub.script, ScriptMode::Subscript);
    assert!(sub.script_baseline > 0);
}

#[test]
fn test_link_color_marker_precedes_link_text() {
    let doc = build("<p>see <a href=\"next.xml\">next</a></p>");
    let tree = doc.tree();
    let colors: Vec<Color> = tree
        .terminals(doc.root())
        .filter_map(|id| match &tree[id].kind {
            CellKind::Color(ColorChange { color, .. }) => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(colors.first(), Some(&Color::LINK_BLUE));
    assert_eq!(tree[word_id(&doc, "next")].link.as_ref().unwrap().href, "next.xml");
    assert!(tree[word_id(&doc, "see")].link.is_none());
}

#[test]
fn test_link_at_word_position() {
    let doc = build("<p>see <a href=\"next.xml\">next</a></p>");
    let (x, y) = doc.tree().absolute_position(word_id(&doc, "next"));
    assert_eq!(doc.link_at(x + 1, y + 1).unwrap().href, "next.xml");
    let (x, y) = doc.tree().absolute_position(word_id(&doc, "see"));
    assert!(doc.link_at(x + 1, y + 1).is_none());
}

#[test]
fn test_anchor_position() {
    let doc = build(
        "<p><a name=\"top\">Top</a></p><p>a<br/>b<br/>c</p><p><a name=\"end\"/>End</p>",
    );
    let (_, top) = doc.anchor_position("top").unwrap();
    let (_, end) = doc.anchor_position("end").unwrap();
    assert!(end > top);
    assert!(doc.anchor_position("missing").is_none());
}

#[test]
fn test_broken_image_placeholder() {
    let doc = build("<p><img src=\"missing.png\" alt=\"gone\"/></p>");
    let tree = doc.tree();
    let id = tree
        .terminals(doc.root())
        .find(|&id| matches!(tree[id].kind, CellKind::Image(_)))
        .unwrap();
    let CellKind::Image(image) = &tree[id].kind else {
        unreachable!()
    };
    assert!(image.broken);
    assert_eq!(image.alt, "gone");
    assert_eq!((tree[id].rect.width, tree[id].rect.height), (20, 20));
    assert!(doc.images().is_empty());
}

#[test]
fn test_image_resolves_against_document_location() {
    let opener = MemoryOpener::new().with("docs/pic.png", png());
    let markup = page("<p><img src=\"pic.png\"/> <img src=\"pic.png\" width=\"9\"/></p>");
    let doc = build_with(&markup, &opener, Some("docs/index.xml"));
    let tree = doc.tree();
    let images: Vec<_> = tree
        .terminals(doc.root())
        .filter(|&id| matches!(tree[id].kind, CellKind::Image(_)))
        .map(|id| (tree[id].rect.width, tree[id].rect.height))
        .collect();
    assert_eq!(images, [(3, 2), (9, 2)]);
    assert_eq!(doc.images().len(), 1);
    assert!(doc.images().get("docs/pic.png").is_some());
}

#[test]
fn test_rule_and_pagebreak() {
    let doc = build("<p>a</p><hr size=\"4\"/><p>b<pagebreak/>c</p>");
    let tree = doc.tree();
    let rule = tree
        .terminals(doc.root())
        .find(|&id| matches!(tree[id].kind, CellKind::Rule(_)))
        .unwrap();
    assert_eq!(tree[rule].rect.height, 4);
    let breaks = doc.page_breaks(10_000);
    assert_eq!(breaks.len(), 2);
    assert_eq!(breaks.last(), Some(&doc.height()));
}

// ---------------------------------------------------------------------------
// Tables and lists
// ---------------------------------------------------------------------------

#[test]
fn test_table_cells_share_a_row() {
    let doc = build(
        "<table border=\"1\"><tr><th>Key</th><td>a</td></tr><tr><td>x</td><td>b</td></tr></table>",
    );
    let tree = doc.tree();
    let pos = |text: &str| tree.absolute_position(word_id(&doc, text));
    assert_eq!(pos("Key").1, pos("a").1);
    assert!(pos("a").0 > pos("Key").0);
    assert!(pos("x").1 > pos("Key").1);
    assert_eq!(pos("b").0, pos("a").0);
    assert_eq!(pos("b").1, pos("x").1);
}

#[test]
fn test_stray_text_in_table_is_dropped() {
    let doc = build("<table><tr>junk<td>a</td></tr></table>");
    assert_eq!(word_texts(&doc), ["a"]);
}

#[test]
fn test_table_markup_outside_table_is_rejected() {
    assert_eq!(
        build_error("<p><td>a</td></p>"),
        ParseErrorKind::Handler("<td> outside of a table".to_string())
    );
    assert_eq!(
        build_error("<table><p>x</p></table>"),
        ParseErrorKind::Handler("<p> directly inside a table or list".to_string())
    );
}

/// The table holding `id`.
fn enclosing_table(doc: &Document, id: CellId) -> &TableData {
    let tree = doc.tree();
    let mut current = tree.parent(id);
    while let Some(cell) = current {
        if let Some(table) = tree.container(cell).and_then(|data| data.table()) {
            return table;
        }
        current = tree.parent(cell);
    }
    panic!("{id:?} is not inside a table");
}

#[test]
fn test_absurd_spans_build_a_small_table() {
    let doc = build(
        "<table><tr><td colspan=\"4000000000\" \
         rowspan=\"99999999999999999999999\">x</td></tr></table>",
    );
    let table = enclosing_table(&doc, word_id(&doc, "x"));
    assert_eq!(table.columns.len(), MAX_COLSPAN);
    assert_eq!(table.rows(), 1);
    assert_eq!(
        table.slot(0, 0).map(|slot| (slot.colspan, slot.rowspan)),
        Some((MAX_COLSPAN, MAX_ROWSPAN))
    );
}

#[test]
fn test_rowspan_covers_only_rows_that_exist() {
    let doc = build(
        "<table><tr><td rowspan=\"50\">a</td><td>b</td></tr>\
         <tr><td>c</td></tr></table>",
    );
    let table = enclosing_table(&doc, word_id(&doc, "a"));
    assert_eq!(table.rows(), 2);
    let tree = doc.tree();
    let (b, c) = (word_id(&doc, "b"), word_id(&doc, "c"));
    assert_eq!(tree.absolute_position(b).0, tree.absolute_position(c).0);
}

#[test]
fn test_absurd_margins_lay_out() {
    let mut doc = build(
        "<div margin_left=\"2000000000\" margin_right=\"2000000000\">x</div>\
         <div margin_left=\"-2000000000\" margin_top=\"5000000%\">y</div>\
         <p text_indent=\"2000000000\">z</p>",
    );
    doc.layout(800);
    let tree = doc.tree();
    let x = tree.absolute_position(word_id(&doc, "x"));
    assert!(x.0 >= MAX_LENGTH);
    let z = tree.absolute_position(word_id(&doc, "z"));
    assert!(z.0 >= MAX_LENGTH);
    assert!(doc.height() > 0);
    assert_eq!(doc.text().split_whitespace().collect::<Vec<_>>(), ["x", "y", "z"]);
}

#[test]
fn test_absurd_sizes_are_clamped() {
    let opener = MemoryOpener::new().with("pic.png", png());
    let markup = page(
        "<hr size=\"2000000000\" width=\"2000000000\"/>\
         <p><img src=\"pic.png\" width=\"-7\" height=\"2000000000\"/></p>\
         <table width=\"2000000000%\" cellspacing=\"2000000000\" cellpadding=\"2000000000\">\
         <tr><td width=\"2000000000\">t</td></tr></table>\
         <p><font size=\"+2147483647\">big</font></p>",
    );
    let doc = build_with(&markup, &opener, None);
    let tree = doc.tree();

    let rule = tree
        .terminals(doc.root())
        .find(|&id| matches!(tree[id].kind, CellKind::Rule(_)))
        .unwrap();
    assert_eq!(tree[rule].rect.height, MAX_LENGTH);
    assert_eq!(tree[rule].rect.width, MAX_LENGTH);

    let image = tree
        .terminals(doc.root())
        .find(|&id| matches!(tree[id].kind, CellKind::Image(_)))
        .unwrap();
    assert_eq!((tree[image].rect.width, tree[image].rect.height), (0, MAX_LENGTH));

    let table = enclosing_table(&doc, word_id(&doc, "t"));
    assert_eq!((table.spacing, table.padding), (MAX_LENGTH, MAX_LENGTH));
    assert!(doc.height() > 0);
    assert_eq!(word_texts(&doc), ["t", "big"]);
}

#[test]
fn test_ordered_list_markers() {
    let doc = build("<ol start=\"3\"><li>x</li><li>y</li></ol><ul><li>z</li></ul>");
    assert_eq!(word_texts(&doc), ["3.", "x", "4.", "y", "\u{2022}", "z"]);
    let tree = doc.tree();
    let marker = tree.absolute_position(word_id(&doc, "3."));
    let content = tree.absolute_position(word_id(&doc, "x"));
    assert!(content.0 > marker.0);
}

#[test]
fn test_list_item_outside_list_is_rejected() {
    assert_eq!(
        build_error("<li>x</li>"),
        ParseErrorKind::Handler("list item outside of a list".to_string())
    );
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

const SEARCH_FORM: &str = "<form action=\"/search\">\
    <input type=\"hidden\" name=\"lang\" value=\"en\"/>\
    <select name=\"q\"><option>a b</option><option value=\"c\">Cee</option></select>\
    <input type=\"submit\" name=\"go\" value=\"Go\"/>\
    </form>";

#[test]
fn test_form_submission_encodes_values() {
    let doc = build(SEARCH_FORM);
    let form = doc.forms().get(0).unwrap();
    assert_eq!(form.method, Method::Get);
    assert_eq!(form.elements.len(), 3);
    let submission = doc.submit(0, Some(2)).unwrap();
    assert_eq!(submission.url, "/search?lang=en&q=a+b&go=Go");
    assert_eq!(submission.body, None);
}

#[test]
fn test_select_updates_combo_widget() {
    let mut doc = build(SEARCH_FORM);
    let combo = doc
        .tree()
        .find(doc.root(), FindCondition::Widget { form: 0, element: 1 })
        .unwrap();
    let label = |doc: &Document| match &doc.tree()[combo].kind {
        CellKind::Widget(widget) => widget.label.clone(),
        _ => unreachable!(),
    };
    assert_eq!(label(&doc), "a b");
    doc.select(0, 1, 1).unwrap();
    assert_eq!(label(&doc), "Cee");
    assert_eq!(doc.submit(0, None).unwrap().url, "/search?lang=en&q=c");
    assert!(doc.select(0, 1, 7).is_err());
}

#[test]
fn test_post_form_puts_query_in_body() {
    let doc = build(
        "<form action=\"/vote\" method=\"post\">\
         <radiobox name=\"pick\" value=\"1\">One</radiobox>\
         <radiobox name=\"pick\" value=\"2\" checked=\"\">Two</radiobox>\
         </form>",
    );
    let submission = doc.submit(0, None).unwrap();
    assert_eq!(submission.method, Method::Post);
    assert_eq!(submission.url, "/vote");
    assert_eq!(submission.body.as_deref(), Some("pick=2"));

    let tree = doc.tree();
    let radios: Vec<(String, bool)> = tree
        .terminals(doc.root())
        .filter_map(|id| match &tree[id].kind {
            CellKind::Widget(w) if w.kind == WidgetKind::RadioBox => {
                Some((w.label.clone(), w.checked))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        radios,
        [("One".to_string(), false), ("Two".to_string(), true)]
    );
}

#[test]
fn test_control_outside_form_is_rejected() {
    assert_eq!(
        build_error("<p><input type=\"submit\"/></p>"),
        ParseErrorKind::Handler("<input> outside of a form".to_string())
    );
}

#[test]
fn test_nested_forms_and_controls_are_rejected() {
    assert_eq!(
        build_error("<form><form></form></form>"),
        ParseErrorKind::Handler("<form> inside another form".to_string())
    );
    assert_eq!(
        build_error("<form><select name=\"a\"><select name=\"b\"></select></select></form>"),
        ParseErrorKind::Handler("<select> inside another form control".to_string())
    );
    assert_eq!(
        build_error("<form><radiobox name=\"r\"><select></select></radiobox></form>"),
        ParseErrorKind::Handler("<select> inside another form control".to_string())
    );
    assert_eq!(
        build_error("<form><select><option>a<option>b</option></option></select></form>"),
        ParseErrorKind::Handler("<option> inside another form control".to_string())
    );
}

// ---------------------------------------------------------------------------
// DocumentView
// ---------------------------------------------------------------------------

fn view_with(opener: MemoryOpener) -> DocumentView {
    DocumentView::new(context(), Box::new(opener), 400)
}

#[test]
fn test_failed_parse_keeps_previous_document() {
    let mut view = view_with(MemoryOpener::new());
    let first = format!("{DECL}<html><head><title>First</title></head><body>one</body></html>");
    view.set_markup(first.as_bytes(), None).unwrap();

    let err = view
        .set_markup(page("<foobar/>").as_bytes(), None)
        .unwrap_err();
    assert!(matches!(err, DocumentError::Parse(_)));
    assert_eq!(view.title(), Some("First"));
    assert_eq!(view.document().unwrap().text(), "one");
}

#[test]
fn test_open_missing_location_is_io_error() {
    let mut view = view_with(MemoryOpener::new());
    let err = view.open("missing.xml").unwrap_err();
    assert!(matches!(err, DocumentError::Io { ref location, .. } if location == "missing.xml"));
    assert!(view.document().is_none());
}

#[test]
fn test_follow_link_opens_and_scrolls_to_fragment() {
    let next = page("<p>a</p><p>b</p><p>c</p><p><a name=\"part\">Part</a></p><p>d</p>");
    let opener = MemoryOpener::new().with("docs/next.xml", next.into_bytes());
    let mut view = view_with(opener);
    let index = page("<p><a href=\"next.xml#part\">go</a></p>");
    view.set_markup(index.as_bytes(), Some("docs/index.xml")).unwrap();

    let doc = view.document().unwrap();
    let (x, y) = doc.tree().absolute_position(word_id(doc, "go"));
    assert!(view.follow_link(x + 1, y + 1).unwrap());

    assert_eq!(view.location(), Some("docs/next.xml"));
    let (_, anchor) = view.document().unwrap().anchor_position("part").unwrap();
    assert!(anchor > 0);
    assert_eq!(view.scroll_position(), anchor);

    assert!(!view.follow_link(-10, -10).unwrap());
}

#[test]
fn test_freeze_defers_layout_until_thaw() {
    let mut view = view_with(MemoryOpener::new());
    view.freeze();
    view.freeze();
    view.set_markup(page("<p>words words words</p>").as_bytes(), None)
        .unwrap();
    view.resize(300);
    assert!(view.is_layout_pending());
    assert_eq!(view.document().unwrap().layout_width(), None);

    view.thaw();
    assert!(view.is_frozen());
    assert_eq!(view.document().unwrap().layout_width(), None);

    view.thaw();
    assert!(!view.is_layout_pending());
    assert_eq!(view.document().unwrap().layout_width(), Some(300));
}

#[test]
fn test_render_fills_body_background() {
    let mut view = view_with(MemoryOpener::new());
    view.set_markup(page("<p>text</p>").replace("<body>", "<body bgcolor=\"#ff0000\">").as_bytes(), None)
        .unwrap();
    let mut raster = Rasterizer::new(400, 50, Arc::new(FontSet::default()));
    view.render(&mut raster, 50);
    assert_eq!(raster.pixel(0, 0), Some(Color::rgb(255, 0, 0)));
    assert_eq!(raster.pixel(399, 49), Some(Color::rgb(255, 0, 0)));
}

#[test]
fn test_submit_resolves_action_against_location() {
    let mut view = view_with(MemoryOpener::new());
    let markup = page("<form action=\"find.xml\"><input type=\"hidden\" name=\"k\" value=\"v\"/></form>");
    view.set_markup(markup.as_bytes(), Some("docs/index.xml")).unwrap();
    assert_eq!(view.submit(0, None).unwrap().url, "docs/find.xml?k=v");
    assert!(view.submit(4, None).is_err());
}
