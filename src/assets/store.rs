use std::{collections::HashMap, sync::Arc};

use crate::foundation::error::{CanvasError, CanvasResult};

/// Reserved key under which the QR logo is stored and reported.
pub const LOGO_ASSET_ID: &str = "qr.logo";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> CanvasResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 {
            return Err(CanvasError::asset(format!(
                "image has zero area ({width}x{height})"
            )));
        }
        if rgba8_premul.len() != expected {
            return Err(CanvasError::asset(format!(
                "pixel buffer length mismatch: expected {expected}, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Asset ready for composition: an embeddable `data:` URI plus decoded pixels.
pub struct ResolvedAsset {
    pub data_uri: Arc<str>,
    pub image: PreparedImage,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Non-fatal per-layer failure collected during a render cycle.
pub struct LayerWarning {
    /// Identifier of the affected layer ([`LOGO_ASSET_ID`] for the QR logo).
    pub layer_id: String,
    pub message: String,
}

impl std::fmt::Display for LayerWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer '{}': {}", self.layer_id, self.message)
    }
}

#[derive(Clone, Debug, Default)]
/// Settled outcome of one cycle's asset resolutions, keyed by layer id.
///
/// Every requested layer ends up either resolved or warned about; nothing is pending.
pub struct ResolvedAssets {
    by_layer: HashMap<String, ResolvedAsset>,
    warnings: Vec<LayerWarning>,
}

impl ResolvedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layer_id: impl Into<String>, asset: ResolvedAsset) {
        self.by_layer.insert(layer_id.into(), asset);
    }

    pub fn warn(&mut self, layer_id: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(LayerWarning {
            layer_id: layer_id.into(),
            message: message.into(),
        });
    }

    pub fn get(&self, layer_id: &str) -> Option<&ResolvedAsset> {
        self.by_layer.get(layer_id)
    }

    pub fn logo(&self) -> Option<&ResolvedAsset> {
        self.get(LOGO_ASSET_ID)
    }

    pub fn warnings(&self) -> &[LayerWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.by_layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_layer.is_empty()
    }
}
