use crate::assets::store::PreparedImage;
use crate::foundation::core::premultiply_rgba8_in_place;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::svg_raster;

/// Decode encoded image bytes (PNG, JPEG, GIF, WebP, BMP or SVG) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> CanvasResult<PreparedImage> {
    if looks_like_svg(bytes) {
        return decode_svg(bytes);
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| CanvasError::asset(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PreparedImage::new(width, height, rgba8_premul)
}

/// Rasterize an SVG document at its intrinsic size.
pub fn decode_svg(bytes: &[u8]) -> CanvasResult<PreparedImage> {
    let tree = svg_raster::parse_svg(bytes).map_err(|e| CanvasError::asset(e.to_string()))?;
    let (w, h) = svg_raster::intrinsic_px(&tree).map_err(|e| CanvasError::asset(e.to_string()))?;
    let rgba8_premul = svg_raster::rasterize_svg_to_premul_rgba8(&tree, w, h)
        .map_err(|e| CanvasError::asset(e.to_string()))?;
    PreparedImage::new(w, h, rgba8_premul)
}

/// Best-effort MIME sniffing for re-embedding decoded bytes as a `data:` URI.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if looks_like_svg(bytes) {
        return "image/svg+xml";
    }
    image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    let text = head.trim_start_matches('\u{feff}').trim_start();
    (text.starts_with("<svg") || text.starts_with("<?xml") || text.starts_with("<!--"))
        && text.contains("<svg")
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
