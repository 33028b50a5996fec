use std::fmt::Write as _;
use std::sync::Arc;

use crate::canvas::model::{
    CornerDotShape, CornerSquareShape, DotShape, ErrorCorrectionLevel, Gradient, GradientKind,
    QrSpec,
};
use crate::foundation::color::Color;
use crate::foundation::core::Rect;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::svg_raster;
use crate::symbol::shapes::{self, Neighbours};

/// Fill of one symbol region.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionStyle<S> {
    pub shape: S,
    pub color: String,
    pub gradient: Option<Gradient>,
}

/// Logo reservation inside the symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct LogoReservation {
    /// Logo side as a fraction of the module area.
    pub size_fraction: f64,
    /// Clear margin around the logo, in pixels.
    pub margin: f64,
    pub hide_background_dots: bool,
}

/// Everything a symbol renderer needs; derived from [`QrSpec`] per render cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolRequest {
    pub content: String,
    /// Side of the square output in pixels.
    pub size: f64,
    pub margin: f64,
    pub error_correction: ErrorCorrectionLevel,
    /// `0` selects the smallest version that fits.
    pub type_number: u8,
    pub dots: RegionStyle<DotShape>,
    pub background: RegionStyle<()>,
    pub corners_square: RegionStyle<CornerSquareShape>,
    pub corners_dot: RegionStyle<CornerDotShape>,
    pub logo: Option<LogoReservation>,
}

impl SymbolRequest {
    pub fn from_spec(qr: &QrSpec) -> Self {
        let logo = qr.logo.as_ref().map(|logo| {
            let image = qr.image_options.clone().unwrap_or_default();
            let size_fraction = if logo.size > 0.0 && qr.size > 0.0 {
                (logo.size / qr.size).min(1.0)
            } else {
                image.image_size
            };
            LogoReservation {
                size_fraction,
                margin: image.margin,
                hide_background_dots: image.hide_background_dots,
            }
        });
        Self {
            content: qr.content.clone(),
            size: qr.size,
            margin: qr.margin,
            error_correction: qr.qr_options.error_correction_level,
            type_number: qr.qr_options.type_number,
            dots: RegionStyle {
                shape: qr.dots_options.kind,
                color: qr.dots_options.color.clone(),
                gradient: qr.dots_options.gradient.clone(),
            },
            background: RegionStyle {
                shape: (),
                color: qr.background_options.color.clone(),
                gradient: qr.background_options.gradient.clone(),
            },
            corners_square: RegionStyle {
                shape: qr.corners_square_options.kind,
                color: qr.corners_square_options.color.clone(),
                gradient: qr.corners_square_options.gradient.clone(),
            },
            corners_dot: RegionStyle {
                shape: qr.corners_dot_options.kind,
                color: qr.corners_dot_options.color.clone(),
                gradient: qr.corners_dot_options.gradient.clone(),
            },
            logo,
        }
    }

    /// Same request without the logo reservation.
    pub fn without_logo(&self) -> Self {
        Self {
            logo: None,
            ..self.clone()
        }
    }
}

/// Vector rendition of a QR symbol, sized exactly to the requested square.
#[derive(Clone, Debug)]
pub struct RenderedSymbol {
    pub size: f64,
    /// Modules per side.
    pub modules: usize,
    pub svg: String,
    pub tree: Arc<usvg::Tree>,
    /// Where the logo goes, relative to the symbol's top-left corner.
    pub logo_box: Option<Rect>,
}

/// QR symbol generation seam.
///
/// Implementations fail with [`CanvasError::SymbolGeneration`] and never return a partial symbol.
pub trait QrSymbolRenderer: Send + Sync {
    fn render(&self, request: &SymbolRequest) -> CanvasResult<RenderedSymbol>;
}

/// Default renderer: `qrcode` module matrix styled into SVG.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrcodeRenderer;

fn ec_level(level: ErrorCorrectionLevel) -> qrcode::EcLevel {
    match level {
        ErrorCorrectionLevel::L => qrcode::EcLevel::L,
        ErrorCorrectionLevel::M => qrcode::EcLevel::M,
        ErrorCorrectionLevel::Q => qrcode::EcLevel::Q,
        ErrorCorrectionLevel::H => qrcode::EcLevel::H,
    }
}

/// Dark-module matrix, row-major.
struct Matrix {
    n: usize,
    dark: Vec<bool>,
}

impl Matrix {
    fn encode(request: &SymbolRequest) -> CanvasResult<Self> {
        if request.content.is_empty() {
            return Err(CanvasError::symbol("qr content must not be empty"));
        }
        let data = request.content.as_bytes();
        let ec = ec_level(request.error_correction);
        let code = match request.type_number {
            0 => qrcode::QrCode::with_error_correction_level(data, ec),
            v @ 1..=40 => {
                qrcode::QrCode::with_version(data, qrcode::Version::Normal(i16::from(v)), ec)
            }
            v => {
                return Err(CanvasError::symbol(format!(
                    "qr type number must be 0..=40 (got {v})"
                )));
            }
        }
        .map_err(|e| {
            CanvasError::symbol(format!(
                "cannot encode {} bytes at level {:?}: {e}",
                data.len(),
                request.error_correction
            ))
        })?;

        let n = code.width();
        let mut dark = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                dark.push(code[(x, y)] == qrcode::Color::Dark);
            }
        }
        Ok(Self { n, dark })
    }

    fn is_dark(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.n || y as usize >= self.n {
            return false;
        }
        self.dark[y as usize * self.n + x as usize]
    }

    fn in_finder(&self, x: usize, y: usize) -> bool {
        let far = self.n - 7;
        (x < 7 && y < 7) || (x >= far && y < 7) || (x < 7 && y >= far)
    }
}

/// Paint reference for one region, emitting a gradient into `defs` when configured.
fn region_paint(
    defs: &mut String,
    id: &str,
    color: &str,
    gradient: Option<&Gradient>,
    bounds: Rect,
) -> CanvasResult<String> {
    let Some(g) = gradient else {
        let (hex, opacity) = parse_color(color)?.to_svg_paint();
        return Ok(format!(r#"fill="{hex}" fill-opacity="{opacity}""#));
    };
    if g.color_stops.is_empty() {
        return Err(CanvasError::symbol(format!("gradient '{id}' has no color stops")));
    }

    let c = bounds.center();
    let half = bounds.width().max(bounds.height()) / 2.0;
    match g.kind {
        GradientKind::Linear => {
            let (sin, cos) = g.rotation.sin_cos();
            let _ = write!(
                defs,
                r#"<linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}">"#,
                c.x - half * cos,
                c.y - half * sin,
                c.x + half * cos,
                c.y + half * sin,
            );
        }
        GradientKind::Radial => {
            let _ = write!(
                defs,
                r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="{}" cy="{}" r="{}">"#,
                c.x,
                c.y,
                half * std::f64::consts::SQRT_2,
            );
        }
    }
    for stop in &g.color_stops {
        let (hex, opacity) = parse_color(&stop.color)?.to_svg_paint();
        let _ = write!(
            defs,
            r#"<stop offset="{}" stop-color="{hex}" stop-opacity="{opacity}"/>"#,
            stop.offset.clamp(0.0, 1.0)
        );
    }
    defs.push_str(match g.kind {
        GradientKind::Linear => "</linearGradient>",
        GradientKind::Radial => "</radialGradient>",
    });
    Ok(format!(r#"fill="url(#{id})""#))
}

fn parse_color(s: &str) -> CanvasResult<Color> {
    Color::parse(s).map_err(|e| CanvasError::symbol(e.to_string()))
}

impl QrSymbolRenderer for QrcodeRenderer {
    fn render(&self, request: &SymbolRequest) -> CanvasResult<RenderedSymbol> {
        let size = request.size;
        if !(size.is_finite() && size > 0.0) {
            return Err(CanvasError::symbol(format!("qr size must be > 0 (got {size})")));
        }
        let matrix = Matrix::encode(request)?;
        let n = matrix.n;

        let available = size - 2.0 * request.margin.max(0.0);
        let raw_cell = available / n as f64;
        if raw_cell.is_nan() || raw_cell <= 0.0 {
            return Err(CanvasError::symbol(format!(
                "qr size {size} leaves no room for {n} modules with margin {}",
                request.margin
            )));
        }
        // Whole-pixel modules when possible, centred like the quiet zone.
        let cell = if raw_cell >= 1.0 { raw_cell.floor() } else { raw_cell };
        let origin = (size - cell * n as f64) / 2.0;
        let area = Rect::new(origin, origin, origin + cell * n as f64, origin + cell * n as f64);

        let logo_box = request.logo.as_ref().map(|logo| {
            let side = area.width() * logo.size_fraction.clamp(0.0, 1.0);
            Rect::from_center_size(area.center(), (side, side))
        });
        let hidden = match (&request.logo, logo_box) {
            (Some(logo), Some(b)) if logo.hide_background_dots => Some(b.inflate(logo.margin, logo.margin)),
            _ => None,
        };

        let mut dots = String::new();
        for y in 0..n {
            for x in 0..n {
                if !matrix.dark[y * n + x] || matrix.in_finder(x, y) {
                    continue;
                }
                let px = origin + x as f64 * cell;
                let py = origin + y as f64 * cell;
                if let Some(h) = hidden
                    && h.intersect(Rect::new(px, py, px + cell, py + cell)).area() > 0.0
                {
                    continue;
                }
                let (ix, iy) = (x as isize, y as isize);
                let neighbour = |dx: isize, dy: isize| {
                    let (nx, ny) = (ix + dx, iy + dy);
                    matrix.is_dark(nx, ny) && !matrix.in_finder(nx as usize, ny as usize)
                };
                let nb = Neighbours {
                    left: neighbour(-1, 0),
                    right: neighbour(1, 0),
                    top: neighbour(0, -1),
                    bottom: neighbour(0, 1),
                };
                let radii = shapes::dot_radii(request.dots.shape, nb, cell);
                shapes::push_rounded_rect(&mut dots, px, py, cell, cell, radii);
            }
        }

        let far = origin + (n - 7) as f64 * cell;
        let finder_origins = [(origin, origin), (far, origin), (origin, far)];
        let mut rings = String::new();
        let mut centres = String::new();
        for (fx, fy) in finder_origins {
            shapes::push_corner_square(&mut rings, request.corners_square.shape, fx, fy, cell);
            shapes::push_corner_dot(
                &mut centres,
                request.corners_dot.shape,
                fx + 2.0 * cell,
                fy + 2.0 * cell,
                cell,
            );
        }

        let full = Rect::new(0.0, 0.0, size, size);
        let mut defs = String::new();
        let bg_paint = region_paint(
            &mut defs,
            "qr-background",
            &request.background.color,
            request.background.gradient.as_ref(),
            full,
        )?;
        let dots_paint = region_paint(
            &mut defs,
            "qr-dots",
            &request.dots.color,
            request.dots.gradient.as_ref(),
            area,
        )?;
        let rings_paint = region_paint(
            &mut defs,
            "qr-corners-square",
            &request.corners_square.color,
            request.corners_square.gradient.as_ref(),
            area,
        )?;
        let centres_paint = region_paint(
            &mut defs,
            "qr-corners-dot",
            &request.corners_dot.color,
            request.corners_dot.gradient.as_ref(),
            area,
        )?;

        let mut svg = String::with_capacity(dots.len() + rings.len() + centres.len() + 512);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#
        );
        if !defs.is_empty() {
            let _ = write!(svg, "<defs>{defs}</defs>");
        }
        let _ = write!(svg, r#"<rect width="{size}" height="{size}" {bg_paint}/>"#);
        if !dots.is_empty() {
            let _ = write!(svg, r#"<path d="{dots}" {dots_paint}/>"#);
        }
        let _ = write!(svg, r#"<path d="{rings}" fill-rule="evenodd" {rings_paint}/>"#);
        let _ = write!(svg, r#"<path d="{centres}" {centres_paint}/>"#);
        svg.push_str("</svg>");

        let tree = svg_raster::parse_svg_str(&svg)
            .map_err(|e| CanvasError::symbol(format!("styled symbol: {e}")))?;

        tracing::debug!(modules = n, cell, "rendered qr symbol");
        Ok(RenderedSymbol {
            size,
            modules: n,
            svg,
            tree: Arc::new(tree),
            logo_box,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/symbol/render.rs"]
mod tests;
