//! qrcanvas composes a styled QR code with background images, text and markup layers onto a
//! fixed-size canvas, and rasterizes the result to PNG or JPEG.
//!
//! The public API is configuration-first:
//!
//! - Build or [`deserialize`] a [`CanvasConfiguration`] and edit it with the `add_*`,
//!   `update_*` and `remove_*` methods
//! - Check it with [`CanvasConfiguration::validate`]
//! - Create a [`RenderSession`] and call [`RenderSession::preview`] or
//!   [`RenderSession::export`]
//!
//! Markup layer content is drawn as given. Callers accepting untrusted input must sanitize it
//! before building a [`MarkupLayer`].
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod assets;
pub(crate) mod canvas;
pub(crate) mod compile;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod symbol;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{Affine, Point, Rect, Rgba8Premul, Size, Vec2};
pub use crate::foundation::error::{CanvasError, CanvasResult};

pub use crate::canvas::edit::{
    BackgroundPatch, DEFAULT_MARKUP_CONTENT, DEFAULT_QR_RATIO, DEFAULT_TEXT_CONTENT, ExportPatch,
    MarkupPatch, QrPatch, QrPlacement, TextPatch, calculate_default_qr_placement,
};
pub use crate::canvas::exchange::{deserialize, merge_json, serialize};
pub use crate::canvas::model::{
    BackgroundLayer, BackgroundOptions, CanvasConfiguration, ColorStop, CornerDotShape,
    CornerSquareShape, CornersDotOptions, CornersSquareOptions, DotShape, DotsOptions,
    EncodingMode, ErrorCorrectionLevel, ExportSpec, FitMode, Gradient, GradientKind,
    ImageOptions, Layer, LayerKind, LayerRef, LogoSpec, MarkupLayer, OutputFormat, QrOptions,
    QrSpec, TextAlign, TextLayer,
};
pub use crate::canvas::validate::ValidationReport;

pub use crate::assets::resolve::{AssetRequest, AssetResolver, AssetSource, ResolverOpts};
pub use crate::assets::store::{
    LOGO_ASSET_ID, LayerWarning, PreparedImage, ResolvedAsset, ResolvedAssets,
};

pub use crate::symbol::render::{
    LogoReservation, QrSymbolRenderer, QrcodeRenderer, RegionStyle, RenderedSymbol,
    SymbolRequest,
};

pub use crate::compile::compositor::{SYMBOL_NODE_ID, compose, fit_image};
pub use crate::compile::plan::{NodeContent, NodeKind, TextBlock, VisualNode, VisualTree};

pub use crate::render::corners::clamp_corner_radius;
pub use crate::render::cpu::{CpuRasterizer, FrameRGBA};
pub use crate::render::encode::EncodedImage;
pub use crate::render::export::{
    DEFAULT_EXPORT_SCALE, ExportOptions, Exporter, estimate_file_size,
};

pub use crate::session::render_session::{
    ExportedCanvas, Preview, RenderSession, RenderSessionOpts, RenderedCanvas,
};
