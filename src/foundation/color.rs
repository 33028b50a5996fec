use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{CanvasError, CanvasResult};

/// Straight-alpha colour with normalized `0..=1` components.
///
/// Configuration stores colours as CSS strings; they are parsed into this form when rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS colour: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`,
    /// `transparent`, or one of the basic named colours.
    pub fn parse(s: &str) -> CanvasResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CanvasError::validation("colour must be non-empty"));
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map_err(CanvasError::validation);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            let args = args
                .strip_suffix(')')
                .ok_or_else(|| CanvasError::validation(format!("unterminated colour \"{s}\"")))?;
            return parse_rgb_fn(args).map_err(CanvasError::validation);
        }
        named(&lower).ok_or_else(|| CanvasError::validation(format!("unknown colour \"{s}\"")))
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        let [r, g, b, a] = self.to_rgba8();
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }

    /// `#rrggbb` plus opacity, the form SVG paint attributes expect.
    pub fn to_svg_paint(self) -> (String, f64) {
        let [r, g, b, _] = self.to_rgba8();
        (
            format!("#{r:02x}{g:02x}{b:02x}"),
            self.a.clamp(0.0, 1.0),
        )
    }
}

fn to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex colour must be ASCII".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            (r, g, b, a)
        }
        _ => {
            return Err(
                "hex colour must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA (case-insensitive)"
                    .to_owned(),
            );
        }
    };

    Ok(Color::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn parse_rgb_fn(args: &str) -> Result<Color, String> {
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("rgb() expects 3 or 4 components, got {}", parts.len()));
    }

    let channel = |p: &str| -> Result<f64, String> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f64 = pct.parse().map_err(|_| format!("invalid percentage \"{p}\""))?;
            return Ok((v / 100.0).clamp(0.0, 1.0));
        }
        let v: f64 = p.parse().map_err(|_| format!("invalid channel \"{p}\""))?;
        Ok((v / 255.0).clamp(0.0, 1.0))
    };

    let alpha = match parts.get(3) {
        None => 1.0,
        Some(p) => {
            if let Some(pct) = p.strip_suffix('%') {
                let v: f64 = pct.parse().map_err(|_| format!("invalid alpha \"{p}\""))?;
                (v / 100.0).clamp(0.0, 1.0)
            } else {
                let v: f64 = p.parse().map_err(|_| format!("invalid alpha \"{p}\""))?;
                v.clamp(0.0, 1.0)
            }
        }
    };

    Ok(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named(name: &str) -> Option<Color> {
    let rgb = |r: u8, g: u8, b: u8| {
        Color::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    };
    Some(match name {
        "transparent" => Color::rgba(0.0, 0.0, 0.0, 0.0),
        "black" => rgb(0, 0, 0),
        "white" => rgb(255, 255, 255),
        "red" => rgb(255, 0, 0),
        "green" => rgb(0, 128, 0),
        "lime" => rgb(0, 255, 0),
        "blue" => rgb(0, 0, 255),
        "yellow" => rgb(255, 255, 0),
        "cyan" | "aqua" => rgb(0, 255, 255),
        "magenta" | "fuchsia" => rgb(255, 0, 255),
        "gray" | "grey" => rgb(128, 128, 128),
        "silver" => rgb(192, 192, 192),
        "maroon" => rgb(128, 0, 0),
        "navy" => rgb(0, 0, 128),
        "olive" => rgb(128, 128, 0),
        "purple" => rgb(128, 0, 128),
        "teal" => rgb(0, 128, 128),
        "orange" => rgb(255, 165, 0),
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
