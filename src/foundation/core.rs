pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: premul_channel(r, a),
            g: premul_channel(g, a),
            b: premul_channel(b, a),
            a,
        }
    }
}

pub(crate) fn premul_channel(c: u8, a: u8) -> u8 {
    let c = u16::from(c);
    let a = u16::from(a);
    (((c * a) + 127) / 255) as u8
}

pub(crate) fn unpremul_channel(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
    v.min(255) as u8
}

/// Premultiply a tightly packed RGBA8 buffer in place.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = premul_channel(px[0], a);
        px[1] = premul_channel(px[1], a);
        px[2] = premul_channel(px[2], a);
    }
}

/// Convert a premultiplied RGBA8 buffer back to straight alpha.
pub(crate) fn unpremultiply_rgba8(rgba8_premul: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba8_premul.len());
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        out.push(unpremul_channel(px[0], a));
        out.push(unpremul_channel(px[1], a));
        out.push(unpremul_channel(px[2], a));
        out.push(a);
    }
    out
}

/// Map logical canvas pixels to device pixels for a given output scale.
pub(crate) fn device_px(logical: f64, scale: f64) -> u32 {
    (logical * scale).round().max(0.0) as u32
}
