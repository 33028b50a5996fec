use std::sync::Arc;

use crate::assets::store::{LayerWarning, ResolvedAssets};
use crate::canvas::model::{
    BackgroundLayer, CanvasConfiguration, FitMode, Layer, LayerKind, LayerRef, MarkupLayer,
    TextLayer,
};
use crate::compile::plan::{NodeContent, NodeKind, TextBlock, VisualNode, VisualTree};
use crate::foundation::color::Color;
use crate::foundation::core::{Rect, Size};
use crate::symbol::render::RenderedSymbol;

/// Node id of the QR symbol in every [`VisualTree`].
pub const SYMBOL_NODE_ID: &str = "qr";

/// Where an image of `image_w x image_h` pixels lands inside `target` for `mode`.
///
/// Returns `(src, dst)`: the source rectangle in image pixels and the destination rectangle in
/// canvas pixels.
pub fn fit_image(image_w: u32, image_h: u32, target: Rect, mode: FitMode) -> (Rect, Rect) {
    let (iw, ih) = (f64::from(image_w), f64::from(image_h));
    let full = Rect::new(0.0, 0.0, iw, ih);
    if iw <= 0.0 || ih <= 0.0 || target.width() <= 0.0 || target.height() <= 0.0 {
        return (full, target);
    }
    let sx = target.width() / iw;
    let sy = target.height() / ih;
    match mode {
        FitMode::Fill => (full, target),
        FitMode::Contain => {
            let s = sx.min(sy);
            let dst = Rect::from_center_size(target.center(), Size::new(iw * s, ih * s));
            (full, dst)
        }
        FitMode::Cover => {
            let s = sx.max(sy);
            let src = Rect::from_center_size(
                full.center(),
                Size::new(target.width() / s, target.height() / s),
            );
            (src, target)
        }
    }
}

/// Build the ordered visual tree for one render cycle.
///
/// Pure: consumes already-resolved assets and an already-rendered symbol. Layers are stably
/// sorted by `z_index` (ties keep backgrounds, texts, markup, each in insertion order) and the
/// symbol is placed on top unconditionally. Layers without a usable asset are omitted and
/// reported in [`VisualTree::warnings`].
pub fn compose(
    config: &CanvasConfiguration,
    assets: &ResolvedAssets,
    symbol: Arc<RenderedSymbol>,
) -> VisualTree {
    let mut warnings: Vec<LayerWarning> = assets.warnings().to_vec();

    let mut layers: Vec<LayerRef<'_>> = config.layers().collect();
    layers.sort_by_key(|l| l.as_layer().z_index());

    let mut nodes = Vec::with_capacity(layers.len() + 1);
    for layer in layers {
        let node = match layer {
            LayerRef::Background(bg) => background_node(bg, assets, &mut warnings),
            LayerRef::Text(t) => text_node(t, &mut warnings),
            LayerRef::Markup(m) => Some(markup_node(m)),
        };
        nodes.extend(node);
    }

    let qr = &config.qr;
    let logo = assets.logo().map(|a| a.image.clone());
    nodes.push(VisualNode {
        id: SYMBOL_NODE_ID.to_string(),
        kind: NodeKind::Symbol,
        opacity: 1.0,
        content: NodeContent::Symbol {
            bounds: Rect::from_origin_size(qr.position, Size::new(symbol.size, symbol.size)),
            symbol,
            logo,
        },
    });

    VisualTree {
        width: config.export.width,
        height: config.export.height,
        nodes,
        warnings,
    }
}

fn layer_node(layer: &dyn Layer, content: NodeContent) -> VisualNode {
    VisualNode {
        id: layer.id().to_string(),
        kind: NodeKind::Layer(layer.kind()),
        opacity: layer.opacity().clamp(0.0, 1.0),
        content,
    }
}

fn background_node(
    bg: &BackgroundLayer,
    assets: &ResolvedAssets,
    warnings: &mut Vec<LayerWarning>,
) -> Option<VisualNode> {
    let Some(asset) = assets.get(&bg.id) else {
        // Failed fetches are already reported by the resolver; anything else was never requested.
        if !warnings.iter().any(|w| w.layer_id == bg.id) {
            tracing::warn!(layer_id = %bg.id, "background omitted: no resolved asset");
            warnings.push(LayerWarning {
                layer_id: bg.id.clone(),
                message: "no resolved asset for background".to_string(),
            });
        }
        return None;
    };
    let target = Rect::from_origin_size(bg.position, bg.size);
    let (src, dst) = fit_image(asset.image.width, asset.image.height, target, bg.mode);
    Some(layer_node(
        bg,
        NodeContent::Image {
            image: asset.image.clone(),
            src,
            dst,
        },
    ))
}

fn text_node(t: &TextLayer, warnings: &mut Vec<LayerWarning>) -> Option<VisualNode> {
    let color = match Color::parse(&t.color) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(layer_id = %t.id, error = %e, "text layer omitted");
            warnings.push(LayerWarning {
                layer_id: t.id.clone(),
                message: e.to_string(),
            });
            return None;
        }
    };
    Some(layer_node(
        t,
        NodeContent::Text(TextBlock {
            lines: t.content.lines().map(str::to_string).collect(),
            origin: t.position,
            font_size: t.font_size,
            color,
            font_family: t.font_family.clone(),
            font_weight: t.font_weight,
            align: t.effective_align(),
            line_height: t.effective_line_height(),
        }),
    ))
}

fn markup_node(m: &MarkupLayer) -> VisualNode {
    layer_node(
        m,
        NodeContent::Markup {
            content: m.content.clone(),
            bounds: Rect::from_origin_size(m.position, m.size),
        },
    )
}

/// Kind of a node for diagnostics.
pub fn node_kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Layer(LayerKind::Background) => "background",
        NodeKind::Layer(LayerKind::Text) => "text",
        NodeKind::Layer(LayerKind::Markup) => "markup",
        NodeKind::Symbol => "symbol",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compositor.rs"]
mod tests;
