use crate::canvas::model::{
    BackgroundLayer, BackgroundOptions, CanvasConfiguration, CornersDotOptions,
    CornersSquareOptions, DotsOptions, ExportSpec, FitMode, ImageOptions, LogoSpec, MarkupLayer,
    OutputFormat, QrOptions, TextAlign, TextLayer,
};
use crate::foundation::core::{Point, Size};
use crate::foundation::error::{CanvasError, CanvasResult};

pub const DEFAULT_TEXT_CONTENT: &str = "New text";
pub const DEFAULT_MARKUP_CONTENT: &str = "<div>HTML</div>";
/// Fraction of the shorter canvas side used by [`calculate_default_qr_placement`].
pub const DEFAULT_QR_RATIO: f64 = 0.6;

fn new_layer_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Partial update for a [`BackgroundLayer`]; `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackgroundPatch {
    pub src: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub mode: Option<FitMode>,
    pub z_index: Option<i32>,
    pub opacity: Option<f64>,
}

/// Partial update for a [`TextLayer`]. `Some(None)` resets `text_align` or `line_height` to the
/// renderer default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextPatch {
    pub content: Option<String>,
    pub position: Option<Point>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<u16>,
    pub z_index: Option<i32>,
    pub opacity: Option<f64>,
    pub text_align: Option<Option<TextAlign>>,
    pub line_height: Option<Option<f64>>,
}

/// Partial update for a [`MarkupLayer`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkupPatch {
    pub content: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub z_index: Option<i32>,
    pub opacity: Option<f64>,
}

/// Partial update for the QR symbol. `logo` and `image_options` use a nested `Option` so a
/// patch can clear them (`Some(None)`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QrPatch {
    pub content: Option<String>,
    pub size: Option<f64>,
    pub position: Option<Point>,
    pub margin: Option<f64>,
    pub dots_options: Option<DotsOptions>,
    pub background_options: Option<BackgroundOptions>,
    pub corners_square_options: Option<CornersSquareOptions>,
    pub corners_dot_options: Option<CornersDotOptions>,
    pub image_options: Option<Option<ImageOptions>>,
    pub qr_options: Option<QrOptions>,
    pub logo: Option<Option<LogoSpec>>,
}

/// Partial update for the export settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportPatch {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<OutputFormat>,
    pub quality: Option<f64>,
    pub border_radius: Option<f64>,
}

/// Centred square placement for the QR symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QrPlacement {
    pub position: Point,
    pub size: f64,
}

/// Centre a square of `min(width, height) * ratio` on a `width x height` canvas.
pub fn calculate_default_qr_placement(width: u32, height: u32, ratio: f64) -> QrPlacement {
    let (w, h) = (f64::from(width), f64::from(height));
    let size = (w.min(h) * ratio).floor();
    QrPlacement {
        position: Point::new(((w - size) / 2.0).floor(), ((h - size) / 2.0).floor()),
        size,
    }
}

macro_rules! apply {
    ($target:expr, $patch:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = $patch.$field {
                $target.$field = v;
            }
        )+
    };
}

fn unknown_layer(kind: &str, id: &str) -> CanvasError {
    CanvasError::validation(format!("no {kind} layer with id '{id}'"))
}

impl CanvasConfiguration {
    /// Append a background layer covering the whole canvas and return its id.
    pub fn add_background(&mut self, src: impl Into<String>) -> String {
        let id = new_layer_id();
        self.backgrounds.push(BackgroundLayer {
            id: id.clone(),
            src: src.into(),
            position: Point::ZERO,
            size: Size::new(f64::from(self.export.width), f64::from(self.export.height)),
            mode: FitMode::Fill,
            z_index: 1,
            opacity: 1.0,
        });
        id
    }

    /// Append a text layer with default styling and return its id.
    pub fn add_text(&mut self) -> String {
        let id = new_layer_id();
        self.texts.push(TextLayer {
            id: id.clone(),
            content: DEFAULT_TEXT_CONTENT.to_string(),
            position: Point::new(100.0, 100.0),
            font_size: 24.0,
            color: "#000000".to_string(),
            font_family: "Arial".to_string(),
            font_weight: 400,
            z_index: 10,
            opacity: 1.0,
            text_align: None,
            line_height: None,
        });
        id
    }

    /// Append a markup layer with placeholder content and return its id.
    pub fn add_markup(&mut self) -> String {
        let id = new_layer_id();
        self.html_modules.push(MarkupLayer {
            id: id.clone(),
            content: DEFAULT_MARKUP_CONTENT.to_string(),
            position: Point::new(200.0, 200.0),
            size: Size::new(200.0, 100.0),
            z_index: 5,
            opacity: 1.0,
        });
        id
    }

    pub fn update_background(&mut self, id: &str, patch: BackgroundPatch) -> CanvasResult<()> {
        let layer = self
            .backgrounds
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| unknown_layer("background", id))?;
        apply!(layer, patch; src, position, size, mode, z_index, opacity);
        Ok(())
    }

    pub fn update_text(&mut self, id: &str, patch: TextPatch) -> CanvasResult<()> {
        let layer = self
            .texts
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| unknown_layer("text", id))?;
        apply!(
            layer, patch;
            content, position, font_size, color, font_family, font_weight, z_index, opacity,
            text_align, line_height
        );
        Ok(())
    }

    pub fn update_markup(&mut self, id: &str, patch: MarkupPatch) -> CanvasResult<()> {
        let layer = self
            .html_modules
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| unknown_layer("markup", id))?;
        apply!(layer, patch; content, position, size, z_index, opacity);
        Ok(())
    }

    /// Remove a background layer; returns whether a layer was removed.
    pub fn remove_background(&mut self, id: &str) -> bool {
        let before = self.backgrounds.len();
        self.backgrounds.retain(|l| l.id != id);
        self.backgrounds.len() != before
    }

    pub fn remove_text(&mut self, id: &str) -> bool {
        let before = self.texts.len();
        self.texts.retain(|l| l.id != id);
        self.texts.len() != before
    }

    pub fn remove_markup(&mut self, id: &str) -> bool {
        let before = self.html_modules.len();
        self.html_modules.retain(|l| l.id != id);
        self.html_modules.len() != before
    }

    pub fn update_qr(&mut self, patch: QrPatch) {
        let qr = &mut self.qr;
        apply!(qr, patch;
            content,
            size,
            position,
            margin,
            dots_options,
            background_options,
            corners_square_options,
            corners_dot_options,
            image_options,
            qr_options,
            logo,
        );
    }

    pub fn update_export(&mut self, patch: ExportPatch) {
        let export: &mut ExportSpec = &mut self.export;
        apply!(export, patch; width, height, format, quality, border_radius);
    }

    /// Re-centre the QR symbol at `ratio` of the shorter canvas side.
    pub fn center_qr(&mut self, ratio: f64) {
        let placement = calculate_default_qr_placement(self.export.width, self.export.height, ratio);
        self.qr.position = placement.position;
        self.qr.size = placement.size;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/edit.rs"]
mod tests;
