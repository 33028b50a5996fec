use std::sync::Arc;

use crate::assets::store::PreparedImage;
use crate::compile::compositor::node_kind_name;
use crate::compile::plan::{NodeContent, VisualNode, VisualTree};
use crate::foundation::core::{Affine, Rect, device_px};
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::{svg_raster, text};

/// A rendered canvas as RGBA8 pixels, premultiplied alpha, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Snapshot a [`VisualTree`] with `vello_cpu`.
///
/// Vector content (text, markup, the QR symbol) is rasterized at device resolution first, so
/// raising the scale sharpens rather than upsamples it.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuRasterizer;

struct Paint {
    image: vello_cpu::Image,
    width: f64,
    height: f64,
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Render every node bottom to top at `scale` device pixels per logical pixel.
    #[tracing::instrument(skip(self, tree), fields(nodes = tree.nodes.len()))]
    pub fn rasterize(&self, tree: &VisualTree, scale: f64) -> CanvasResult<FrameRGBA> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CanvasError::raster(format!("invalid scale factor {scale}")));
        }
        let width = device_px(f64::from(tree.width), scale);
        let height = device_px(f64::from(tree.height), scale);
        if width == 0 || height == 0 {
            return Err(CanvasError::raster(format!(
                "zero-area canvas ({}x{} at scale {scale})",
                tree.width, tree.height
            )));
        }
        let w16: u16 = width
            .try_into()
            .map_err(|_| CanvasError::raster(format!("canvas width {width}px exceeds u16")))?;
        let h16: u16 = height
            .try_into()
            .map_err(|_| CanvasError::raster(format!("canvas height {height}px exceeds u16")))?;

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        for node in &tree.nodes {
            self.draw_node(&mut ctx, tree, node, scale, (width, height))?;
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }

    fn draw_node(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        tree: &VisualTree,
        node: &VisualNode,
        scale: f64,
        device: (u32, u32),
    ) -> CanvasResult<()> {
        let opacity = node.opacity.clamp(0.0, 1.0) as f32;
        if opacity <= 0.0 {
            return Ok(());
        }
        tracing::trace!(id = %node.id, kind = node_kind_name(node.kind), "draw node");

        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        let device_xf = Affine::scale(scale);

        match &node.content {
            NodeContent::Image { image, src, dst } => {
                draw_image_rect(ctx, image, *src, *dst, device_xf)?;
            }
            NodeContent::Text(block) => {
                let svg = text::text_block_tree(block, tree.width, tree.height)?;
                draw_paint(ctx, &svg_paint(&svg, device.0, device.1)?, Affine::IDENTITY);
            }
            NodeContent::Markup { content, bounds } => {
                draw_markup(ctx, content, *bounds, tree, scale, device)?;
            }
            NodeContent::Symbol {
                symbol,
                bounds,
                logo,
            } => {
                let w = device_px(bounds.width(), scale).max(1);
                let h = device_px(bounds.height(), scale).max(1);
                let paint = svg_paint(&symbol.tree, w, h)?;
                let at = Affine::translate((bounds.x0 * scale, bounds.y0 * scale));
                draw_paint(ctx, &paint, at);

                if let (Some(logo), Some(logo_box)) = (logo, symbol.logo_box) {
                    let target = logo_box + bounds.origin().to_vec2();
                    let (src, dst) = crate::compile::compositor::fit_image(
                        logo.width,
                        logo.height,
                        target,
                        crate::canvas::model::FitMode::Contain,
                    );
                    draw_image_rect(ctx, logo, src, dst, device_xf)?;
                }
            }
        }

        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }
}

fn draw_markup(
    ctx: &mut vello_cpu::RenderContext,
    content: &str,
    bounds: Rect,
    tree: &VisualTree,
    scale: f64,
    device: (u32, u32),
) -> CanvasResult<()> {
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Ok(());
    }
    if text::is_svg_markup(content) {
        match svg_raster::parse_svg_str(content) {
            Ok(svg) => {
                let w = device_px(bounds.width(), scale).max(1);
                let h = device_px(bounds.height(), scale).max(1);
                let at = Affine::translate((bounds.x0 * scale, bounds.y0 * scale));
                draw_paint(ctx, &svg_paint(&svg, w, h)?, at);
                return Ok(());
            }
            Err(e) => tracing::debug!(error = %e, "markup is not valid svg; drawing as text"),
        }
    }
    let svg = text::markup_text_tree(content, bounds, tree.width, tree.height)?;
    draw_paint(ctx, &svg_paint(&svg, device.0, device.1)?, Affine::IDENTITY);
    Ok(())
}

/// Draw the `src` region of `image` into canvas rectangle `dst`.
fn draw_image_rect(
    ctx: &mut vello_cpu::RenderContext,
    image: &PreparedImage,
    src: Rect,
    dst: Rect,
    device_xf: Affine,
) -> CanvasResult<()> {
    if src.width() <= 0.0 || src.height() <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
        return Ok(());
    }
    let paint = rgba_premul_to_image(&image.rgba8_premul, image.width, image.height)?;
    let xf = device_xf
        * Affine::translate(dst.origin().to_vec2())
        * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
        * Affine::translate(-src.origin().to_vec2());
    ctx.set_transform(affine_to_cpu(xf));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(src.x0, src.y0, src.x1, src.y1));
    Ok(())
}

fn draw_paint(ctx: &mut vello_cpu::RenderContext, paint: &Paint, at: Affine) {
    ctx.set_transform(affine_to_cpu(at));
    ctx.set_paint(paint.image.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, paint.width, paint.height));
}

fn svg_paint(tree: &usvg::Tree, width: u32, height: u32) -> CanvasResult<Paint> {
    let rgba = svg_raster::rasterize_svg_to_premul_rgba8(tree, width, height)?;
    Ok(Paint {
        image: rgba_premul_to_image(&rgba, width, height)?,
        width: f64::from(width),
        height: f64::from(height),
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CanvasResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CanvasError::raster("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CanvasError::raster("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CanvasError::raster("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(bytes: &[u8], width: u32, height: u32) -> CanvasResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
