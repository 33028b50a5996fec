use crate::canvas::model::{ExportSpec, OutputFormat};
use crate::compile::plan::VisualTree;
use crate::foundation::color::Color;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::corners::{apply_rounded_corners, clamp_corner_radius};
use crate::render::cpu::CpuRasterizer;
use crate::render::encode::{EncodedImage, encode_frame};

/// Scale factor used when the caller does not override it.
pub const DEFAULT_EXPORT_SCALE: f64 = 2.0;

/// Per-call export overrides.
///
/// Every field left as `None` falls back to the configuration's [`ExportSpec`] (or
/// [`DEFAULT_EXPORT_SCALE`] for the scale). Overrides apply to one call only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportOptions {
    pub scale: Option<f64>,
    pub quality: Option<f64>,
    /// Corner radius in logical pixels.
    pub corner_radius: Option<f64>,
    pub format: Option<OutputFormat>,
    /// Backdrop used when flattening for formats without alpha. Defaults to white.
    pub background: Option<Color>,
}

impl ExportOptions {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Resolved {
    scale: f64,
    quality: f64,
    corner_radius: f64,
    format: OutputFormat,
    background: Color,
}

fn resolve_options(spec: &ExportSpec, opts: &ExportOptions) -> CanvasResult<Resolved> {
    let scale = opts.scale.unwrap_or(DEFAULT_EXPORT_SCALE);
    if !(scale.is_finite() && scale > 0.0) {
        return Err(CanvasError::validation(format!(
            "export scale must be a positive number (got {scale})"
        )));
    }
    let quality = opts.quality.unwrap_or(spec.quality);
    if !(0.0..=1.0).contains(&quality) {
        return Err(CanvasError::validation(format!(
            "export quality must be between 0 and 1 (got {quality})"
        )));
    }
    Ok(Resolved {
        scale,
        quality,
        corner_radius: opts.corner_radius.unwrap_or(spec.border_radius),
        format: opts.format.unwrap_or(spec.format),
        background: opts.background.unwrap_or(Color::WHITE),
    })
}

/// Reject overrides the exporter would refuse, without rendering anything.
pub(crate) fn check_options(spec: &ExportSpec, opts: &ExportOptions) -> CanvasResult<()> {
    resolve_options(spec, opts).map(|_| ())
}

/// Snapshot, clip and encode a composed canvas.
#[derive(Clone, Copy, Debug, Default)]
pub struct Exporter {
    rasterizer: CpuRasterizer,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce a complete encoded image or an error; never a partial result.
    ///
    /// Out-of-range quality or a non-positive scale fail before any pixel work.
    #[tracing::instrument(skip(self, tree, spec), fields(width = tree.width, height = tree.height))]
    pub fn export(
        &self,
        tree: &VisualTree,
        spec: &ExportSpec,
        opts: &ExportOptions,
    ) -> CanvasResult<EncodedImage> {
        let r = resolve_options(spec, opts)?;
        let mut frame = self.rasterizer.rasterize(tree, r.scale)?;
        let radius = clamp_corner_radius(r.corner_radius, r.scale, frame.width, frame.height);
        if radius > 0.0 {
            tracing::debug!(radius, "clipping export to rounded corners");
            apply_rounded_corners(&mut frame, radius)?;
        }
        encode_frame(&frame, r.format, r.quality, r.background)
    }
}

/// Approximate encoded size in bytes of an export at `opts.scale`.
///
/// Encodes once at scale 1 and scales by the area ratio. Falls back to half a byte per output
/// pixel when that encode fails.
pub fn estimate_file_size(
    exporter: &Exporter,
    tree: &VisualTree,
    spec: &ExportSpec,
    opts: &ExportOptions,
) -> u64 {
    let scale = opts
        .scale
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_EXPORT_SCALE);
    let area = scale * scale;
    let unit = opts.clone().with_scale(1.0);
    match exporter.export(tree, spec, &unit) {
        Ok(img) => (img.bytes.len() as f64 * area).round() as u64,
        Err(e) => {
            tracing::debug!(error = %e, "estimate fell back to pixel-count heuristic");
            (f64::from(tree.width) * f64::from(tree.height) * area * 0.5).round() as u64
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
