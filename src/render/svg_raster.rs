use std::sync::{Arc, OnceLock};

use crate::foundation::error::{CanvasError, CanvasResult};

/// Largest raster edge produced from an SVG, in device pixels.
pub const MAX_SVG_DIM: u32 = 16_384;

static SYSTEM_FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// Process-wide font database with system fonts loaded once.
pub fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    SYSTEM_FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

fn svg_options() -> usvg::Options<'static> {
    usvg::Options {
        fontdb: system_fontdb(),
        font_resolver: make_font_resolver(),
        ..Default::default()
    }
}

/// Parse SVG bytes with the shared font database.
pub fn parse_svg(bytes: &[u8]) -> CanvasResult<usvg::Tree> {
    usvg::Tree::from_data(bytes, &svg_options())
        .map_err(|e| CanvasError::raster(format!("parse svg: {e}")))
}

pub fn parse_svg_str(text: &str) -> CanvasResult<usvg::Tree> {
    usvg::Tree::from_str(text, &svg_options())
        .map_err(|e| CanvasError::raster(format!("parse svg: {e}")))
}

/// Intrinsic pixel size of a parsed tree (rounded up, at least 1x1).
pub fn intrinsic_px(tree: &usvg::Tree) -> CanvasResult<(u32, u32)> {
    let size = tree.size();
    Ok((to_px(size.width())?, to_px(size.height())?))
}

fn to_px(v: f32) -> CanvasResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(CanvasError::raster("svg has invalid width/height"));
    }
    let px = (v.ceil() as u32).max(1);
    if px > MAX_SVG_DIM {
        return Err(CanvasError::raster(format!(
            "svg raster size too large: {px} (max {MAX_SVG_DIM})"
        )));
    }
    Ok(px)
}

/// Rasterize `tree` stretched to `width x height` pixels, premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> CanvasResult<Vec<u8>> {
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(CanvasError::raster(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CanvasError::raster("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

/// Resolve requested families, then generic sans/serif, then any installed face.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}
