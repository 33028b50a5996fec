//! Text and markup layout as SVG documents covering the whole logical canvas.

use std::fmt::Write as _;

use html5ever::tendril::TendrilSink as _;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::canvas::model::TextAlign;
use crate::compile::plan::TextBlock;
use crate::foundation::color::Color;
use crate::foundation::core::Rect;
use crate::foundation::error::CanvasResult;
use crate::render::svg_raster;

// Arial/Helvetica vertical metrics in em units.
const ASCENT_EM: f64 = 0.905;
const DESCENT_EM: f64 = 0.212;
/// Approximate advance of an average glyph, used only for markup line wrapping.
const AVG_CHAR_EM: f64 = 0.55;

pub const MARKUP_FONT_SIZE: f64 = 16.0;
pub const MARKUP_LINE_HEIGHT: f64 = 1.2;
pub const MARKUP_FONT_FAMILY: &str = "sans-serif";

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Baseline of line `index` in a block whose top edge is `top`.
fn baseline(top: f64, index: usize, font_size: f64, line_height: f64) -> f64 {
    let lh = font_size * line_height;
    let half_leading = (lh - (ASCENT_EM + DESCENT_EM) * font_size) / 2.0;
    top + index as f64 * lh + half_leading + ASCENT_EM * font_size
}

fn svg_open(out: &mut String, width: u32, height: u32) {
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
}

struct LineStyle<'a> {
    family: &'a str,
    size: f64,
    weight: u16,
    color: Color,
}

fn push_lines(
    out: &mut String,
    lines: &[String],
    x: f64,
    top: f64,
    line_height: f64,
    anchor: &str,
    style: &LineStyle<'_>,
) {
    let (fill, fill_opacity) = style.color.to_svg_paint();
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let _ = write!(
            out,
            r#"<text id="line-{i}" xml:space="preserve" x="{x}" y="{y}" text-anchor="{anchor}" font-family="{family}" font-size="{size}" font-weight="{weight}" fill="{fill}" fill-opacity="{fill_opacity}">{text}</text>"#,
            y = baseline(top, i, style.size, line_height),
            family = escape_xml(style.family),
            size = style.size,
            weight = style.weight,
            text = escape_xml(line),
        );
    }
}

fn block_style(block: &TextBlock) -> LineStyle<'_> {
    LineStyle {
        family: &block.font_family,
        size: block.font_size,
        weight: block.font_weight,
        color: block.color,
    }
}

/// SVG for `block` with lines aligned inside a box of `block_width`.
pub fn text_block_svg(block: &TextBlock, canvas_w: u32, canvas_h: u32, block_width: f64) -> String {
    let (x, anchor) = match block.align {
        TextAlign::Left => (block.origin.x, "start"),
        TextAlign::Center => (block.origin.x + block_width / 2.0, "middle"),
        TextAlign::Right => (block.origin.x + block_width, "end"),
    };
    let mut out = String::new();
    svg_open(&mut out, canvas_w, canvas_h);
    push_lines(
        &mut out,
        &block.lines,
        x,
        block.origin.y,
        block.line_height,
        anchor,
        &block_style(block),
    );
    out.push_str("</svg>");
    out
}

/// Widest shaped line of `block`; `0` when no glyphs could be shaped.
pub fn measure_block_width(block: &TextBlock, canvas_w: u32, canvas_h: u32) -> CanvasResult<f64> {
    let left = TextBlock {
        align: TextAlign::Left,
        ..block.clone()
    };
    let tree = svg_raster::parse_svg_str(&text_block_svg(&left, canvas_w, canvas_h, 0.0))?;
    let width = (0..block.lines.len())
        .filter_map(|i| tree.node_by_id(&format!("line-{i}")))
        .map(|node| f64::from(node.abs_bounding_box().width()))
        .fold(0.0, f64::max);
    Ok(width)
}

/// Parsed tree for a text block, aligned per its [`TextAlign`].
pub fn text_block_tree(block: &TextBlock, canvas_w: u32, canvas_h: u32) -> CanvasResult<usvg::Tree> {
    let width = match block.align {
        TextAlign::Left => 0.0,
        _ => measure_block_width(block, canvas_w, canvas_h)?,
    };
    svg_raster::parse_svg_str(&text_block_svg(block, canvas_w, canvas_h, width))
}

/// Whether markup is a standalone SVG document.
pub fn is_svg_markup(content: &str) -> bool {
    let head = content.trim_start();
    let head = head.get(..4).unwrap_or(head);
    head.eq_ignore_ascii_case("<svg") || content.trim_start().starts_with("<?xml")
}

const BREAKING_TAGS: &[&str] = &[
    "br", "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre",
];

/// Elements whose text content is never drawn.
const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

/// Flatten HTML markup into text lines.
///
/// Block-level elements and `<br>` break lines; runs of whitespace collapse and empty lines
/// are dropped.
pub fn html_to_lines(content: &str) -> Vec<String> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(content);
    let mut text = String::with_capacity(content.len());
    collect_text(&dom.document, &mut text);

    text.split('\n')
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect()
}

fn collect_text(handle: &Handle, out: &mut String) {
    let mut breaks = false;
    match &handle.data {
        NodeData::Text { contents } => {
            out.push_str(&contents.borrow());
            return;
        }
        NodeData::Element { name, .. } => {
            let tag = name.local.as_ref();
            if HIDDEN_TAGS.contains(&tag) {
                return;
            }
            breaks = BREAKING_TAGS.contains(&tag);
        }
        NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => return,
        _ => {}
    }
    if breaks {
        out.push('\n');
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
    if breaks {
        out.push('\n');
    }
}

/// Greedy word wrap against an estimated glyph advance.
pub fn wrap_lines(lines: &[String], max_width: f64, font_size: f64) -> Vec<String> {
    let max_chars = ((max_width / (font_size * AVG_CHAR_EM)).floor() as usize).max(1);
    let mut out = Vec::new();
    for line in lines {
        let mut current = String::new();
        for word in line.split(' ') {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        out.push(current);
    }
    out
}

/// Parsed tree for non-SVG markup: plain text wrapped and clipped to `bounds`.
pub fn markup_text_tree(
    content: &str,
    bounds: Rect,
    canvas_w: u32,
    canvas_h: u32,
) -> CanvasResult<usvg::Tree> {
    let lines = wrap_lines(&html_to_lines(content), bounds.width(), MARKUP_FONT_SIZE);
    let mut out = String::new();
    svg_open(&mut out, canvas_w, canvas_h);
    let _ = write!(
        out,
        r#"<defs><clipPath id="markup-clip"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath></defs><g clip-path="url(#markup-clip)">"#,
        bounds.x0,
        bounds.y0,
        bounds.width(),
        bounds.height()
    );
    push_lines(
        &mut out,
        &lines,
        bounds.x0,
        bounds.y0,
        MARKUP_LINE_HEIGHT,
        "start",
        &LineStyle {
            family: MARKUP_FONT_FAMILY,
            size: MARKUP_FONT_SIZE,
            weight: 400,
            color: Color::BLACK,
        },
    );
    out.push_str("</g></svg>");
    svg_raster::parse_svg_str(&out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
