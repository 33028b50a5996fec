use super::*;
use crate::foundation::core::Point;

fn block(align: TextAlign) -> TextBlock {
    TextBlock {
        lines: vec!["Scan <me>".to_string(), "".to_string(), "& go".to_string()],
        origin: Point::new(10.0, 20.0),
        font_size: 10.0,
        color: Color::BLACK,
        font_family: "Arial".to_string(),
        font_weight: 700,
        align,
        line_height: 1.2,
    }
}

#[test]
fn xml_is_escaped() {
    assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
}

#[test]
fn baseline_follows_line_height() {
    let b0 = baseline(0.0, 0, 10.0, 1.2);
    assert!((b0 - 9.465).abs() < 1e-9);
    assert!((baseline(0.0, 2, 10.0, 1.2) - b0 - 24.0).abs() < 1e-9);
}

#[test]
fn text_svg_skips_blank_lines_and_escapes_content() {
    let svg = text_block_svg(&block(TextAlign::Left), 100, 50, 0.0);
    assert!(svg.contains(r#"id="line-0""#));
    assert!(!svg.contains(r#"id="line-1""#));
    assert!(svg.contains(r#"id="line-2""#));
    assert!(svg.contains("Scan &lt;me&gt;"));
    assert!(svg.contains(r#"font-weight="700""#));
    assert!(svg.contains(r#"text-anchor="start""#));
}

#[test]
fn alignment_moves_the_anchor() {
    let svg = text_block_svg(&block(TextAlign::Center), 100, 50, 40.0);
    assert!(svg.contains(r#"x="30""#) && svg.contains(r#"text-anchor="middle""#));
    let svg = text_block_svg(&block(TextAlign::Right), 100, 50, 40.0);
    assert!(svg.contains(r#"x="50""#) && svg.contains(r#"text-anchor="end""#));
}

#[test]
fn text_tree_parses_for_every_alignment() {
    for align in [TextAlign::Left, TextAlign::Center, TextAlign::Right] {
        let tree = text_block_tree(&block(align), 100, 50).unwrap();
        assert_eq!(tree.size().width(), 100.0);
    }
}

#[test]
fn html_is_flattened_to_lines() {
    let lines = html_to_lines("<div>Hello <b>world</b></div><p>a &amp; b &#65;&#x42;</p>");
    assert_eq!(lines, vec!["Hello world", "a & b AB"]);
    assert_eq!(html_to_lines("one<br/>two"), vec!["one", "two"]);
    assert_eq!(html_to_lines("fish & chips"), vec!["fish & chips"]);
}

#[test]
fn attributes_and_hidden_elements_never_leak_into_text() {
    assert_eq!(html_to_lines(r#"<div title="a>b">x</div>"#), vec!["x"]);
    assert_eq!(
        html_to_lines("<style>p { color: red }</style><p>shown</p><script>alert(1)</script>"),
        vec!["shown"]
    );
    assert_eq!(html_to_lines("<p>a<!-- note --> b</p>"), vec!["a b"]);
}

#[test]
fn wrapping_is_greedy_by_words() {
    let width = 7.0 * MARKUP_FONT_SIZE * AVG_CHAR_EM;
    let out = wrap_lines(&["aaa bbb ccc".to_string()], width, MARKUP_FONT_SIZE);
    assert_eq!(out, vec!["aaa bbb", "ccc"]);
    let out = wrap_lines(&["supercalifragilistic".to_string()], width, MARKUP_FONT_SIZE);
    assert_eq!(out, vec!["supercalifragilistic"]);
}

#[test]
fn svg_markup_is_detected() {
    assert!(is_svg_markup("  <SVG xmlns='http://www.w3.org/2000/svg'></SVG>"));
    assert!(is_svg_markup("<?xml version=\"1.0\"?><svg/>"));
    assert!(!is_svg_markup("<div>HTML</div>"));
}

#[test]
fn markup_text_tree_parses() {
    let tree = markup_text_tree(
        "<div>HTML</div>",
        Rect::new(200.0, 200.0, 400.0, 300.0),
        800,
        600,
    )
    .unwrap();
    assert_eq!(tree.size().height(), 600.0);
}
