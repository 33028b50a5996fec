use crate::foundation::core::{Point, Size};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Declarative description of one composite canvas.
///
/// A configuration is pure data:
/// - mutated through the explicit edit operations in [`crate::BackgroundPatch`] and friends
/// - exchanged as JSON via [`crate::serialize`] / [`crate::deserialize`]
/// - checked on demand with [`CanvasConfiguration::validate`]
///
/// Rendering never mutates it; the render session snapshots it per cycle.
pub struct CanvasConfiguration {
    /// The single QR symbol of this canvas.
    pub qr: QrSpec,
    /// Background image layers in creation order.
    pub backgrounds: Vec<BackgroundLayer>,
    /// Text layers in creation order.
    pub texts: Vec<TextLayer>,
    /// Markup layers in creation order.
    pub html_modules: Vec<MarkupLayer>,
    /// Output canvas and encoding parameters.
    pub export: ExportSpec,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// QR symbol parameters and placement.
pub struct QrSpec {
    /// Encoded payload.
    pub content: String,
    /// Side length of the square symbol in canvas pixels.
    pub size: f64,
    /// Top-left corner of the symbol on the canvas.
    pub position: Point,
    /// Quiet-zone margin in pixels, inside `size`.
    pub margin: f64,
    pub dots_options: DotsOptions,
    pub background_options: BackgroundOptions,
    pub corners_square_options: CornersSquareOptions,
    pub corners_dot_options: CornersDotOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_options: Option<ImageOptions>,
    #[serde(default)]
    pub qr_options: QrOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoSpec>,
}

impl Default for QrSpec {
    fn default() -> Self {
        Self {
            content: "https://example.com".to_string(),
            size: 200.0,
            position: Point::new(50.0, 50.0),
            margin: 4.0,
            dots_options: DotsOptions {
                color: "#0000ff".to_string(),
                kind: DotShape::Square,
                gradient: None,
            },
            background_options: BackgroundOptions {
                color: "#ffffff".to_string(),
                gradient: None,
            },
            corners_square_options: CornersSquareOptions {
                color: "#0000ff".to_string(),
                kind: CornerSquareShape::Square,
                gradient: None,
            },
            corners_dot_options: CornersDotOptions {
                color: "#000000".to_string(),
                kind: CornerDotShape::Square,
                gradient: None,
            },
            image_options: None,
            qr_options: QrOptions::default(),
            logo: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DotsOptions {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: DotShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundOptions {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CornersSquareOptions {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CornerSquareShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CornersDotOptions {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CornerDotShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Shape of the ordinary data modules.
pub enum DotShape {
    #[default]
    Square,
    Dots,
    Rounded,
    ExtraRounded,
    Classy,
    ClassyRounded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Shape of the three 7x7 finder rings.
pub enum CornerSquareShape {
    #[default]
    Square,
    Dot,
    ExtraRounded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Shape of the 3x3 centre of each finder pattern.
pub enum CornerDotShape {
    #[default]
    Square,
    Dot,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Gradient paint for one QR region.
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    /// Rotation in radians (linear gradients only).
    #[serde(default)]
    pub rotation: f64,
    pub color_stops: Vec<ColorStop>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f64,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Logo placement options inside the QR symbol.
pub struct ImageOptions {
    /// Skip data modules covered by the logo.
    #[serde(default = "default_true")]
    pub hide_background_dots: bool,
    /// Logo size as a fraction of the symbol, used when the logo has no explicit size.
    #[serde(default = "default_image_size")]
    pub image_size: f64,
    /// Clear margin around the logo in pixels.
    #[serde(default = "default_image_margin")]
    pub margin: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            hide_background_dots: true,
            image_size: default_image_size(),
            margin: default_image_margin(),
            cross_origin: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_image_size() -> f64 {
    0.4
}

fn default_image_margin() -> f64 {
    5.0
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrOptions {
    /// Symbol version `1..=40`; `0` picks the smallest version that fits.
    #[serde(default)]
    pub type_number: u8,
    #[serde(default)]
    pub mode: EncodingMode,
    #[serde(default)]
    pub error_correction_level: ErrorCorrectionLevel,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            type_number: 0,
            mode: EncodingMode::Byte,
            error_correction_level: ErrorCorrectionLevel::M,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Requested segment mode. The encoder always picks an optimal segmentation; this is
/// carried for interchange compatibility.
pub enum EncodingMode {
    Numeric,
    Alphanumeric,
    #[default]
    Byte,
    Kanji,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
/// QR redundancy tier, ordered by increasing redundancy: `L < M < Q < H`.
pub enum ErrorCorrectionLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogoSpec {
    /// Data URI or remote URL.
    pub src: String,
    /// Logo side length in pixels.
    pub size: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// How a background image fills its declared box.
pub enum FitMode {
    /// Stretch to the box, ignoring aspect ratio.
    #[default]
    #[serde(alias = "stretch")]
    Fill,
    /// Fit inside the box preserving aspect ratio, centred.
    Contain,
    /// Cover the box preserving aspect ratio, cropping overflow.
    Cover,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundLayer {
    pub id: String,
    /// Data URI, remote URL or local file path.
    pub src: String,
    pub position: Point,
    pub size: Size,
    pub mode: FitMode,
    pub z_index: i32,
    pub opacity: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: String,
    pub content: String,
    pub position: Point,
    pub font_size: f64,
    pub color: String,
    pub font_family: String,
    /// CSS weight, `100..=900` in steps of 100.
    pub font_weight: u16,
    pub z_index: i32,
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
}

impl TextLayer {
    pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

    pub fn effective_align(&self) -> TextAlign {
        self.text_align.unwrap_or_default()
    }

    pub fn effective_line_height(&self) -> f64 {
        self.line_height.unwrap_or(Self::DEFAULT_LINE_HEIGHT)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Raw markup block.
///
/// The content is carried verbatim into the visual tree and is never sanitized: callers
/// accepting untrusted input must sanitize before constructing a layer.
pub struct MarkupLayer {
    pub id: String,
    pub content: String,
    pub position: Point,
    pub size: Size,
    pub z_index: i32,
    pub opacity: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
}

impl OutputFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSpec {
    /// Canvas width in logical pixels.
    pub width: u32,
    /// Canvas height in logical pixels.
    pub height: u32,
    pub format: OutputFormat,
    /// Encoder quality in `[0, 1]` (JPEG only; PNG is lossless).
    pub quality: f64,
    /// Corner radius in logical pixels; `0` keeps square corners.
    pub border_radius: f64,
}

impl Default for ExportSpec {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: OutputFormat::Png,
            quality: 0.9,
            border_radius: 0.0,
        }
    }
}

/// Kind tag of a user layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Background,
    Text,
    Markup,
}

/// Capabilities shared by every user layer: positioned, stackable and fadeable.
pub trait Layer {
    fn id(&self) -> &str;
    fn kind(&self) -> LayerKind;
    fn position(&self) -> Point;
    fn z_index(&self) -> i32;
    fn opacity(&self) -> f64;
}

macro_rules! impl_layer {
    ($ty:ty, $kind:expr) => {
        impl Layer for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn kind(&self) -> LayerKind {
                $kind
            }

            fn position(&self) -> Point {
                self.position
            }

            fn z_index(&self) -> i32 {
                self.z_index
            }

            fn opacity(&self) -> f64 {
                self.opacity
            }
        }
    };
}

impl_layer!(BackgroundLayer, LayerKind::Background);
impl_layer!(TextLayer, LayerKind::Text);
impl_layer!(MarkupLayer, LayerKind::Markup);

/// Borrowed view over any user layer, tagged by kind.
#[derive(Clone, Copy, Debug)]
pub enum LayerRef<'a> {
    Background(&'a BackgroundLayer),
    Text(&'a TextLayer),
    Markup(&'a MarkupLayer),
}

impl<'a> LayerRef<'a> {
    pub fn as_layer(&self) -> &'a dyn Layer {
        match *self {
            Self::Background(l) => l,
            Self::Text(l) => l,
            Self::Markup(l) => l,
        }
    }
}

impl CanvasConfiguration {
    /// All user layers in tie-break order: backgrounds, then texts, then markup, each in
    /// insertion order.
    pub fn layers(&self) -> impl Iterator<Item = LayerRef<'_>> {
        self.backgrounds
            .iter()
            .map(LayerRef::Background)
            .chain(self.texts.iter().map(LayerRef::Text))
            .chain(self.html_modules.iter().map(LayerRef::Markup))
    }

    /// Look up any user layer by identifier.
    pub fn layer(&self, id: &str) -> Option<LayerRef<'_>> {
        self.layers().find(|l| l.as_layer().id() == id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/model.rs"]
mod tests;
