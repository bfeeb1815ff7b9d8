// Rendering scenarios checked against the recorded canvas calls

use mdpaint::canvas::{Align, Border};
use mdpaint::config::RenderOptions;
use mdpaint::error::Error;
use mdpaint::icons::IconMode;
use mdpaint::list_layout::{item_break_height, item_style, nested_list_spacing};
use mdpaint::markdown_ast::{Document, NodeType};
use mdpaint::markdown_parser::parse_source;
use mdpaint::theme::{FontStyle, Theme};
use mdpaint::{RenderReport, Renderer};
use std::fs;

use crate::recording_canvas::{LEFT_MARGIN, Op, PAGE_WIDTH, RecordingCanvas};

fn render_on(
    source: &str,
    options: RenderOptions,
    canvas: RecordingCanvas,
) -> (RecordingCanvas, RenderReport) {
    let mut doc = parse_source(source);
    let mut renderer = Renderer::with_theme(canvas, options, Theme::light());
    let report = renderer.render(&mut doc).unwrap();
    assert_eq!(renderer.depth(), 1);
    (renderer.into_canvas(), report)
}

fn render_with(source: &str, options: RenderOptions) -> (RecordingCanvas, RenderReport) {
    render_on(source, options, RecordingCanvas::new())
}

fn render(source: &str) -> (RecordingCanvas, RenderReport) {
    render_with(source, RenderOptions::default())
}

fn with_icons(mode: IconMode) -> RenderOptions {
    RenderOptions {
        icon_mode: mode,
        ..RenderOptions::default()
    }
}

#[test]
fn test_checkbox_items() {
    let (canvas, report) = render("- [ ] a\n- [x] b\n");
    assert_eq!(canvas.texts(), vec!["☐", "a", "☑", "b"]);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_checkbox_glyph_fallback() {
    let canvas = RecordingCanvas::new().without_glyphs(['☐', '☑']);
    let (canvas, _) = render_on("- [ ] a\n- [x] b\n", RenderOptions::default(), canvas);
    assert_eq!(canvas.texts(), vec!["[ ]", "a", "[x]", "b"]);
}

#[test]
fn test_bullet_falls_back_to_dash() {
    let canvas = RecordingCanvas::new().without_glyphs(['•']);
    let (canvas, _) = render_on("- one\n", RenderOptions::default(), canvas);
    assert_eq!(canvas.texts(), vec!["-", "one"]);
}

#[test]
fn test_nested_ordered_numbering_resumes() {
    let (canvas, _) = render("1. A\n   1. A1\n   2. A2\n2. B\n");
    assert_eq!(
        canvas.texts(),
        vec!["1.", "A", "1.", "A1", "2.", "A2", "2.", "B"]
    );
}

#[test]
fn test_ordered_list_start() {
    let (canvas, _) = render("3. c\n4. d\n");
    assert_eq!(canvas.texts(), vec!["3.", "c", "4.", "d"]);
}

#[test]
fn test_list_item_margins() {
    let options = RenderOptions {
        em: Some(10.0),
        indent: Some(30.0),
        ..RenderOptions::default()
    };
    let (canvas, _) = render_with("- a\n", options);

    // List margin, item content margin, then both restored on leave
    let list = LEFT_MARGIN + 30.0;
    let content = list + 12.0;
    assert_eq!(canvas.left_margins(), vec![list, content, list, LEFT_MARGIN]);
}

fn assert_feeds(actual: Vec<f64>, expected: Vec<f64>) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(&expected) {
        assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
    }
}

#[test]
fn test_nested_list_margin_follows_item_content() {
    let options = RenderOptions {
        em: Some(10.0),
        indent: Some(30.0),
        ..RenderOptions::default()
    };
    let (canvas, _) = render_with("- a\n  - b\n", options);

    let list = LEFT_MARGIN + 30.0;
    let content = list + 12.0;
    let nested = content + 30.0;
    let nested_content = nested + 12.0;
    assert_eq!(
        canvas.left_margins(),
        vec![list, content, nested, nested_content, nested, content, list, LEFT_MARGIN]
    );
}

#[test]
fn test_nested_list_advances_part_of_a_line() {
    let (canvas, _) = render("- a\n  - b\n");
    let normal = Theme::light().normal;
    let item = item_style(&normal);
    let item_break = item_break_height(&item);
    assert_feeds(
        canvas.feeds(),
        vec![
            item_break,
            nested_list_spacing(&item),
            item_break,
            normal.line_height(),
        ],
    );
}

#[test]
fn test_list_kind_transition_adds_a_line() {
    let normal = Theme::light().normal;
    let item_break = item_break_height(&item_style(&normal));
    let line = normal.line_height();

    let (canvas, _) = render("- a\n\n1. b\n");
    assert_feeds(canvas.feeds(), vec![item_break, line, line, item_break, line]);

    // Same kind again: no transition line
    let (canvas, _) = render("- a\n\n* b\n");
    assert_feeds(canvas.feeds(), vec![item_break, line, item_break, line]);
}

#[test]
fn test_inline_styles_reach_the_canvas() {
    let (canvas, _) = render("*i* ~~s~~ **b** plain\n");
    let styles = canvas.styled_texts();
    let style_of = |text: &str| {
        styles
            .iter()
            .find(|(t, _)| t == text)
            .map(|(_, style)| *style)
            .unwrap()
    };
    assert_eq!(style_of("i"), FontStyle::italic());
    assert_eq!(
        style_of("s"),
        FontStyle {
            strikeout: true,
            ..FontStyle::REGULAR
        }
    );
    assert_eq!(style_of("b"), FontStyle::bold());
    assert_eq!(style_of(" plain"), FontStyle::REGULAR);
}

#[test]
fn test_leaving_strong_keeps_heading_bold() {
    let (canvas, _) = render("## A **b** c\n");
    let styles = canvas.styled_texts();
    assert_eq!(
        styles.iter().map(|(t, _)| t.as_str()).collect::<Vec<_>>(),
        vec!["A ", "b", " c"]
    );
    assert!(styles.iter().all(|(_, style)| style.bold));

    let (canvas, _) = render("*a **b** c*\n");
    let styles = canvas.styled_texts();
    assert_eq!(styles[2].0, " c");
    assert!(styles[2].1.italic);
    assert!(!styles[2].1.bold);
}

#[test]
fn test_blockquote_indents_and_restores() {
    let (canvas, _) = render("> quoted\n");
    let indent = 3.0 * 5.5;
    assert_eq!(canvas.left_margins(), vec![LEFT_MARGIN + indent, LEFT_MARGIN]);
    assert_eq!(canvas.texts(), vec!["quoted"]);
}

#[test]
fn test_table_cells_share_column_width() {
    let (canvas, _) = render("| Qty |\n|---|\n| Qty |\n");
    let cells = canvas.cells();
    assert_eq!(cells.len(), 3);

    let width = 3.0 * 5.5 + 5.5;
    assert_eq!(
        cells[0],
        &Op::Cell {
            width,
            height: 13.0,
            text: "Qty".into(),
            border: Border::BOTTOM,
            align: Align::Left,
            fill: false,
        }
    );
    assert_eq!(
        cells[1],
        &Op::Cell {
            width,
            height: 13.0,
            text: "Qty".into(),
            border: Border::NONE,
            align: Align::Left,
            fill: false,
        }
    );
    // Closing rule spans the whole table
    assert_eq!(
        cells[2],
        &Op::Cell {
            width,
            height: 0.0,
            text: String::new(),
            border: Border::TOP,
            align: Align::Left,
            fill: false,
        }
    );
}

#[test]
fn test_cell_content_is_buffered() {
    let (canvas, _) = render("| H |\n|---|\n| a **b** [c](d) `e` |\n");
    assert!(canvas.texts().is_empty());
    match canvas.cells()[1] {
        Op::Cell { text, .. } => assert_eq!(text, "a b c e"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_strip_and_keep_share_boundaries() {
    let source = "Go 🇩🇪 and 🚀!\n";
    let (stripped, _) = render_with(source, with_icons(IconMode::Strip));
    let (kept, _) = render_with(source, with_icons(IconMode::Keep));

    assert_eq!(stripped.texts(), vec!["Go ", " ", " and ", " ", "!"]);
    assert_eq!(kept.texts().len(), stripped.texts().len());
    assert_eq!(kept.texts()[2], " and ");
}

#[test]
fn test_text_icons() {
    let (canvas, _) = render_with("Go 🚀\n", with_icons(IconMode::Text));
    assert_eq!(canvas.texts(), vec!["Go ", "[launch]"]);
}

#[test]
fn test_missing_emoji_asset_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let options = RenderOptions {
        emoji_dir: dir.path().to_path_buf(),
        ..RenderOptions::default()
    };
    let (canvas, report) = render_with("Go 🚀\n", options);
    assert_eq!(canvas.texts(), vec!["Go ", " "]);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].element, "Emoji");
}

#[test]
fn test_emoji_asset_drawn_inline() {
    let dir = tempfile::tempdir().unwrap();
    let asset = dir.path().join("1f680.png");
    fs::write(&asset, b"png").unwrap();
    let options = RenderOptions {
        emoji_dir: dir.path().to_path_buf(),
        ..RenderOptions::default()
    };
    let (canvas, report) = render_with("Go 🚀\n", options);
    assert!(report.diagnostics.is_empty());
    assert!(canvas.ops.contains(&Op::InlineImage(asset)));
}

#[test]
fn test_missing_image_degrades() {
    let (canvas, report) = render("before\n\n![alt](nowhere.png)\n\nafter\n");
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].element, "Image");
    assert!(matches!(
        report.diagnostics[0].error,
        Error::ResourceNotFound(_)
    ));
    assert_eq!(canvas.texts(), vec!["before", "after"]);
}

#[test]
fn test_image_resolved_from_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("pic.png"), b"png").unwrap();
    let options = RenderOptions {
        base_dir: Some(dir.path().to_path_buf()),
        ..RenderOptions::default()
    };
    let (canvas, report) = render_with("![pic](pic.png)\n", options);
    assert!(report.diagnostics.is_empty());
    assert!(canvas.ops.contains(&Op::Image(dir.path().join("pic.png"))));
}

#[test]
fn test_links() {
    let (canvas, _) = render("[site](https://example.com) and [top](#top)\n");
    assert!(canvas.ops.contains(&Op::WriteLink {
        text: "site".into(),
        url: "https://example.com".into(),
    }));
    assert_eq!(canvas.texts(), vec!["site", " and ", "top"]);
    assert!(
        !canvas
            .ops
            .iter()
            .any(|op| matches!(op, Op::WriteLink { text, .. } if text == "top"))
    );
}

#[test]
fn test_horizontal_rule_as_line() {
    let options = RenderOptions {
        hr_page_break: false,
        ..RenderOptions::default()
    };
    let (canvas, _) = render_with("a\n\n---\n\nb\n", options);
    assert!(canvas.ops.contains(&Op::Line {
        x1: LEFT_MARGIN,
        x2: PAGE_WIDTH - LEFT_MARGIN,
    }));
    assert!(!canvas.ops.contains(&Op::AddPage));

    let (canvas, _) = render("a\n\n---\n\nb\n");
    assert!(canvas.ops.contains(&Op::AddPage));
}

#[test]
fn test_code_block_without_highlighting() {
    let (canvas, _) = render("```\nfn main() {}\n```\n");
    assert!(canvas.ops.contains(&Op::MultiCell {
        text: "fn main() {}".into(),
        fill: true,
    }));
}

#[test]
fn test_code_block_with_highlighting() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("rust.toml"),
        "[[rules]]\ngroup = \"statement\"\npattern = '\\blet\\b'\n\n[[rules]]\ngroup = \"constant.number\"\npattern = '[0-9]+'\n",
    )
    .unwrap();
    let options = RenderOptions {
        syntax_dir: Some(dir.path().to_path_buf()),
        ..RenderOptions::default()
    };
    let (canvas, report) = render_with("```rust\nlet x = 1;\n```\n", options);
    assert!(report.diagnostics.is_empty());
    assert_eq!(canvas.texts(), vec!["let", " x = ", "1", ";"]);
}

#[test]
fn test_inline_code_box() {
    let options = RenderOptions {
        code_box: true,
        ..RenderOptions::default()
    };
    let (canvas, _) = render_with("Use `x` now\n", options);
    assert_eq!(
        canvas.cells(),
        vec![&Op::Cell {
            width: 5.5 + 5.5,
            height: 11.0,
            text: "x".into(),
            border: Border::NONE,
            align: Align::Center,
            fill: true,
        }]
    );
    assert_eq!(canvas.texts(), vec!["Use ", " now"]);
}

#[test]
fn test_html_block_is_opaque() {
    let (canvas, _) = render("<div>\nhi\n</div>\n");
    let texts: Vec<&str> = canvas
        .cells()
        .into_iter()
        .filter_map(|op| match op {
            Op::Cell { text, fill: true, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["<div>", "hi", "</div>"]);
}

#[test]
fn test_table_of_contents_links_headings() {
    let options = RenderOptions {
        generate_toc: true,
        ..RenderOptions::default()
    };
    let (canvas, _) = render_with("# A\n\n## B\n", options);
    let ops = &canvas.ops;

    assert!(ops.contains(&Op::WriteLinkId {
        text: " • A".into(),
        link: 1,
    }));
    assert!(ops.contains(&Op::WriteLinkId {
        text: "   • B".into(),
        link: 2,
    }));
    let page_break = ops.iter().position(|op| *op == Op::AddPage).unwrap();
    let first_target = ops.iter().position(|op| *op == Op::SetLink(1)).unwrap();
    assert!(page_break < first_target);
    assert!(ops.contains(&Op::SetLink(2)));
}

#[test]
fn test_nested_structures_keep_the_stack_balanced() {
    let source = "\
# Title

> quote with *emphasis* and a list:
> - one
> - two

1. first
   > nested quote
   ```
   code in item
   ```
2. second
   - [x] done
     1. deep

| Name | Link |
|---|---|
| **bold** | [x](https://example.com) |
";
    let (_, report) = render(source);
    assert!(report.diagnostics.is_empty());
    assert!(report.max_depth >= 5);
    assert!(report.events > 0);
}

#[test]
fn test_nesting_limit_is_fatal() {
    let mut doc = Document::new();
    let mut parent = doc.root();
    for _ in 0..300 {
        parent = doc.append(parent, NodeType::BlockQuote);
    }
    let mut renderer = Renderer::with_theme(
        RecordingCanvas::new(),
        RenderOptions::default(),
        Theme::light(),
    );
    assert!(matches!(
        renderer.render(&mut doc),
        Err(Error::StackOverflow(_))
    ));
}

#[test]
fn test_inline_text_snapshot() {
    let (canvas, _) = render("# Title\n\nHello *world* and **more**\n");
    insta::assert_snapshot!(canvas.texts().join("|"), @"Title|Hello |world| and |more");
}
