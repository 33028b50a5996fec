use std::sync::Arc;

use crate::assets::store::{LayerWarning, PreparedImage};
use crate::canvas::model::{LayerKind, TextAlign};
use crate::foundation::color::Color;
use crate::foundation::core::{Point, Rect};
use crate::symbol::render::RenderedSymbol;

#[derive(Clone, Debug)]
/// Ordered, fully-resolved scene for one render cycle.
///
/// Nodes are listed bottom to top; the QR symbol is always last. The tree holds no I/O handles
/// and can be rasterized any number of times at any scale.
pub struct VisualTree {
    /// Canvas width in logical pixels.
    pub width: u32,
    /// Canvas height in logical pixels.
    pub height: u32,
    pub nodes: Vec<VisualNode>,
    /// Layers omitted from this tree, with the reason.
    pub warnings: Vec<LayerWarning>,
}

impl VisualTree {
    /// Node ids bottom to top.
    pub fn paint_order(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Layer(LayerKind),
    Symbol,
}

#[derive(Clone, Debug)]
/// One positioned visual element.
pub struct VisualNode {
    pub id: String,
    pub kind: NodeKind,
    /// Opacity applied to this node alone, in `[0, 1]`.
    pub opacity: f64,
    pub content: NodeContent,
}

#[derive(Clone, Debug)]
pub enum NodeContent {
    /// Draw `src` (image pixels) into `dst` (canvas pixels).
    Image {
        image: PreparedImage,
        src: Rect,
        dst: Rect,
    },
    Text(TextBlock),
    /// Markup carried verbatim, laid out inside `bounds`.
    Markup { content: String, bounds: Rect },
    Symbol {
        symbol: Arc<RenderedSymbol>,
        bounds: Rect,
        logo: Option<PreparedImage>,
    },
}

#[derive(Clone, Debug, PartialEq)]
/// Unbounded text block anchored at its top-left corner.
pub struct TextBlock {
    pub lines: Vec<String>,
    pub origin: Point,
    pub font_size: f64,
    pub color: Color,
    pub font_family: String,
    pub font_weight: u16,
    pub align: TextAlign,
    /// Multiple of `font_size`.
    pub line_height: f64,
}
