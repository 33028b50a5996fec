use image::ImageEncoder as _;

use crate::assets::data_uri;
use crate::assets::store::PreparedImage;
use crate::canvas::model::OutputFormat;
use crate::foundation::color::Color;
use crate::foundation::core::{premul_channel, unpremultiply_rgba8};
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::cpu::FrameRGBA;

/// Final encoded export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: OutputFormat,
    /// Pixel width (canvas width times scale).
    pub width: u32,
    /// Pixel height (canvas height times scale).
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// Textual `data:` URI form of the encoded bytes.
    pub fn data_uri(&self) -> String {
        data_uri::encode(self.mime(), &self.bytes)
    }
}

/// JPEG quality in `1..=100` from a unit-interval quality.
pub fn jpeg_quality(quality: f64) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

/// Encode a premultiplied frame. JPEG output is flattened onto `background`.
pub fn encode_frame(
    frame: &FrameRGBA,
    format: OutputFormat,
    quality: f64,
    background: Color,
) -> CanvasResult<EncodedImage> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CanvasError::raster("cannot encode a zero-area frame"));
    }
    let bytes = match format {
        OutputFormat::Png => png_bytes(&frame.data, frame.width, frame.height)?,
        OutputFormat::Jpg => {
            let rgb = flatten_premul_onto(&frame.data, background);
            let mut out = Vec::new();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality))
                .write_image(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
                .map_err(|e| CanvasError::raster(format!("jpeg encode: {e}")))?;
            out
        }
    };
    Ok(EncodedImage {
        format,
        width: frame.width,
        height: frame.height,
        bytes,
    })
}

/// PNG-encode a decoded image.
pub fn encode_png(image: &PreparedImage) -> CanvasResult<Vec<u8>> {
    png_bytes(&image.rgba8_premul, image.width, image.height)
}

fn png_bytes(rgba8_premul: &[u8], width: u32, height: u32) -> CanvasResult<Vec<u8>> {
    let straight = unpremultiply_rgba8(rgba8_premul);
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(&straight, width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| CanvasError::raster(format!("png encode: {e}")))?;
    Ok(out)
}

/// `src over background` for every pixel, dropping alpha.
fn flatten_premul_onto(rgba8_premul: &[u8], background: Color) -> Vec<u8> {
    let bgp = background.to_rgba8_premul();
    let mut out = Vec::with_capacity(rgba8_premul.len() / 4 * 3);
    for px in rgba8_premul.chunks_exact(4) {
        let inv = 255 - px[3];
        out.push(px[0].saturating_add(premul_channel(bgp.r, inv)));
        out.push(px[1].saturating_add(premul_channel(bgp.g, inv)));
        out.push(px[2].saturating_add(premul_channel(bgp.b, inv)));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
