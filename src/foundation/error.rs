/// Convenience result type used across qrcanvas.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Per-layer asset failures are normally reported as [`crate::LayerWarning`]s rather than
/// propagated; [`CanvasError::AssetResolution`] only escapes when a caller resolves a single
/// asset directly.
#[derive(thiserror::Error, Debug)]
pub enum CanvasError {
    /// One asset could not be fetched or decoded.
    #[error("asset resolution error: {0}")]
    AssetResolution(String),

    /// QR content/options cannot produce a valid symbol.
    #[error("symbol generation error: {0}")]
    SymbolGeneration(String),

    /// Snapshot or encode step failed.
    #[error("rasterization error: {0}")]
    Rasterization(String),

    /// Malformed serialized configuration.
    #[error("configuration parse error: {0}")]
    ConfigurationParse(String),

    /// Invalid argument passed to an engine entry point.
    #[error("validation error: {0}")]
    Validation(String),

    /// A newer render cycle started before this one finished; its result was discarded.
    #[error("render cycle {generation} was superseded by a newer configuration")]
    Superseded {
        /// Generation of the discarded cycle.
        generation: u64,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CanvasError {
    /// Build a [`CanvasError::AssetResolution`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::AssetResolution(msg.into())
    }

    /// Build a [`CanvasError::SymbolGeneration`] value.
    pub fn symbol(msg: impl Into<String>) -> Self {
        Self::SymbolGeneration(msg.into())
    }

    /// Build a [`CanvasError::Rasterization`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Rasterization(msg.into())
    }

    /// Build a [`CanvasError::ConfigurationParse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ConfigurationParse(msg.into())
    }

    /// Build a [`CanvasError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether this error aborts a whole render cycle (as opposed to a single layer).
    pub fn is_cycle_fatal(&self) -> bool {
        !matches!(self, Self::AssetResolution(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
