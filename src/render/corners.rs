use vello_cpu::kurbo::Shape as _;

use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::cpu::FrameRGBA;

/// Effective corner radius in device pixels.
///
/// The logical radius is multiplied by `scale` and clamped to half the shorter side so
/// opposing corners never overlap.
pub fn clamp_corner_radius(radius: f64, scale: f64, width_px: u32, height_px: u32) -> f64 {
    if !(radius.is_finite() && radius > 0.0) {
        return 0.0;
    }
    let half_short = f64::from(width_px.min(height_px)) / 2.0;
    (radius * scale).min(half_short)
}

/// Clip `frame` to a rounded rectangle of `radius_px`. Non-positive radii are an identity pass.
pub fn apply_rounded_corners(frame: &mut FrameRGBA, radius_px: f64) -> CanvasResult<()> {
    if radius_px.is_nan() || radius_px <= 0.0 {
        return Ok(());
    }
    let w: u16 = frame
        .width
        .try_into()
        .map_err(|_| CanvasError::raster("frame width exceeds u16"))?;
    let h: u16 = frame
        .height
        .try_into()
        .map_err(|_| CanvasError::raster("frame height exceeds u16"))?;
    tracing::debug!(radius_px, width = w, height = h, "clipping rounded corners");

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    let clip = vello_cpu::kurbo::RoundedRect::new(0.0, 0.0, f64::from(w), f64::from(h), radius_px);
    ctx.fill_path(&clip.to_path(0.1));
    ctx.flush();

    let mut mask = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut mask);
    mask_apply_alpha(&mut frame.data, mask.data_as_u8_slice());
    Ok(())
}

/// `dst *= mask.alpha` on premultiplied pixels.
fn mask_apply_alpha(dst: &mut [u8], mask: &[u8]) {
    for (d, m) in dst.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        if w == 255 {
            continue;
        }
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), w);
        }
    }
}

fn mul_div255_u8(x: u16, y: u16) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/corners.rs"]
mod tests;
