use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::assets::resolve::{AssetRequest, AssetResolver, ResolverOpts};
use crate::assets::store::{LOGO_ASSET_ID, LayerWarning};
use crate::canvas::model::CanvasConfiguration;
use crate::compile::compositor::compose;
use crate::compile::plan::VisualTree;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::encode::EncodedImage;
use crate::render::export::{DEFAULT_EXPORT_SCALE, ExportOptions, Exporter, check_options};
use crate::symbol::render::{QrSymbolRenderer, QrcodeRenderer, RenderedSymbol, SymbolRequest};

/// Options controlling a [`RenderSession`].
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Asset fetching behaviour (timeout, user agent, memoization).
    pub resolver: ResolverOpts,
    /// Scale used by [`RenderSession::preview`].
    pub preview_scale: f64,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            resolver: ResolverOpts::default(),
            preview_scale: DEFAULT_EXPORT_SCALE,
        }
    }
}

/// Output of one completed render cycle.
#[derive(Clone, Debug)]
pub struct RenderedCanvas {
    /// Cycle number that produced this canvas.
    pub generation: u64,
    pub tree: VisualTree,
}

impl RenderedCanvas {
    /// Layers omitted from the canvas, with the reason.
    pub fn warnings(&self) -> &[LayerWarning] {
        &self.tree.warnings
    }
}

/// A rasterized preview together with the cycle it came from.
#[derive(Clone, Debug)]
pub struct Preview {
    pub canvas: Arc<RenderedCanvas>,
    pub image: EncodedImage,
}

/// Result of [`RenderSession::export`]: the encoded image plus the layers it is missing.
#[derive(Clone, Debug)]
pub struct ExportedCanvas {
    pub image: EncodedImage,
    /// Layers omitted from the export, with the reason.
    pub warnings: Vec<LayerWarning>,
}

/// Hosts render cycles for a caller-owned [`CanvasConfiguration`].
///
/// Each call to [`RenderSession::render`] snapshots the configuration and starts a new
/// generation. A cycle that finishes after a newer one has started is discarded with
/// [`CanvasError::Superseded`]. Failed cycles never replace the last good result.
pub struct RenderSession {
    generation: AtomicU64,
    resolver: AssetResolver,
    symbols: Arc<dyn QrSymbolRenderer>,
    exporter: Exporter,
    opts: RenderSessionOpts,
    last_good: Mutex<Option<Arc<RenderedCanvas>>>,
    last_preview: Mutex<Option<Arc<Preview>>>,
}

impl RenderSession {
    /// Session backed by the built-in `qrcode` symbol renderer.
    pub fn new(opts: RenderSessionOpts) -> CanvasResult<Self> {
        Self::with_symbol_renderer(opts, Arc::new(QrcodeRenderer))
    }

    pub fn with_symbol_renderer(
        opts: RenderSessionOpts,
        symbols: Arc<dyn QrSymbolRenderer>,
    ) -> CanvasResult<Self> {
        if !(opts.preview_scale.is_finite() && opts.preview_scale > 0.0) {
            return Err(CanvasError::validation(
                "preview_scale must be a positive number",
            ));
        }
        Ok(Self {
            generation: AtomicU64::new(0),
            resolver: AssetResolver::new(opts.resolver.clone())?,
            symbols,
            exporter: Exporter::new(),
            opts,
            last_good: Mutex::new(None),
            last_preview: Mutex::new(None),
        })
    }

    pub fn opts(&self) -> &RenderSessionOpts {
        &self.opts
    }

    /// Generation of the most recently started cycle.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Run one render cycle: resolve assets and render the symbol concurrently, then compose.
    ///
    /// Per-layer asset failures end up in [`RenderedCanvas::warnings`]. Symbol failures fail
    /// the cycle.
    #[tracing::instrument(skip(self, config), fields(generation = tracing::field::Empty))]
    pub async fn render(&self, config: &CanvasConfiguration) -> CanvasResult<Arc<RenderedCanvas>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::Span::current().record("generation", generation);

        let tree = self.build(config.clone()).await?;
        if self.generation() != generation {
            tracing::debug!(generation, latest = self.generation(), "discarding stale render cycle");
            return Err(CanvasError::Superseded { generation });
        }

        let canvas = Arc::new(RenderedCanvas { generation, tree });
        let mut last = self.last_good.lock().await;
        // A newer cycle may have stored its result while this one waited for the lock.
        if last.as_ref().is_none_or(|prev| prev.generation < generation) {
            *last = Some(Arc::clone(&canvas));
        }
        Ok(canvas)
    }

    /// Render and rasterize at the session's preview scale.
    ///
    /// On failure the previous preview stays available through [`RenderSession::last_preview`].
    /// A preview overtaken by a newer cycle while rasterizing is discarded.
    pub async fn preview(&self, config: &CanvasConfiguration) -> CanvasResult<Arc<Preview>> {
        let result = self.preview_inner(config).await;
        match result {
            Ok(preview) => {
                let mut last = self.last_preview.lock().await;
                if last
                    .as_ref()
                    .is_none_or(|prev| prev.canvas.generation < preview.canvas.generation)
                {
                    *last = Some(Arc::clone(&preview));
                }
                Ok(preview)
            }
            Err(err) => {
                if !matches!(err, CanvasError::Superseded { .. }) {
                    tracing::warn!(error = %err, "preview failed; keeping previous preview");
                }
                Err(err)
            }
        }
    }

    async fn preview_inner(&self, config: &CanvasConfiguration) -> CanvasResult<Arc<Preview>> {
        let canvas = self.render(config).await?;
        let opts = ExportOptions::default().with_scale(self.opts.preview_scale);
        let image = self.rasterize(&canvas.tree, config, &opts).await?;
        let generation = canvas.generation;
        if self.generation() != generation {
            tracing::debug!(generation, latest = self.generation(), "discarding stale preview");
            return Err(CanvasError::Superseded { generation });
        }
        Ok(Arc::new(Preview { canvas, image }))
    }

    /// High-fidelity export with per-call overrides.
    ///
    /// Runs its own cycle outside the generation counter, so live previews never supersede it.
    /// Invalid overrides fail before any asset is fetched.
    #[tracing::instrument(skip(self, config, opts))]
    pub async fn export(
        &self,
        config: &CanvasConfiguration,
        opts: &ExportOptions,
    ) -> CanvasResult<ExportedCanvas> {
        check_options(&config.export, opts)?;
        let tree = self.build(config.clone()).await?;
        for w in &tree.warnings {
            tracing::warn!(layer_id = %w.layer_id, message = %w.message, "layer missing from export");
        }
        let image = self.rasterize(&tree, config, opts).await?;
        Ok(ExportedCanvas {
            image,
            warnings: tree.warnings,
        })
    }

    /// Most recent successful render cycle.
    pub async fn last_good(&self) -> Option<Arc<RenderedCanvas>> {
        self.last_good.lock().await.clone()
    }

    /// Most recent successful preview.
    pub async fn last_preview(&self) -> Option<Arc<Preview>> {
        self.last_preview.lock().await.clone()
    }

    async fn build(&self, config: CanvasConfiguration) -> CanvasResult<VisualTree> {
        let mut requests: Vec<AssetRequest> = config
            .backgrounds
            .iter()
            .map(|bg| AssetRequest::new(bg.id.clone(), &bg.src))
            .collect();
        if let Some(logo) = &config.qr.logo {
            requests.push(AssetRequest::new(LOGO_ASSET_ID, &logo.src));
        }

        let request = SymbolRequest::from_spec(&config.qr);
        let (assets, symbol) = tokio::join!(
            self.resolver.resolve_all(requests),
            self.render_symbol(request.clone()),
        );
        let mut symbol = symbol?;
        if request.logo.is_some() && assets.logo().is_none() {
            // Without a logo, the reserved area would stay blank.
            symbol = self.render_symbol(request.without_logo()).await?;
        }

        Ok(compose(&config, &assets, Arc::new(symbol)))
    }

    async fn render_symbol(&self, request: SymbolRequest) -> CanvasResult<RenderedSymbol> {
        let symbols = Arc::clone(&self.symbols);
        tokio::task::spawn_blocking(move || symbols.render(&request))
            .await
            .map_err(|e| CanvasError::symbol(format!("symbol task failed: {e}")))?
    }

    async fn rasterize(
        &self,
        tree: &VisualTree,
        config: &CanvasConfiguration,
        opts: &ExportOptions,
    ) -> CanvasResult<EncodedImage> {
        let exporter = self.exporter;
        let tree = tree.clone();
        let spec = config.export.clone();
        let opts = opts.clone();
        tokio::task::spawn_blocking(move || exporter.export(&tree, &spec, &opts))
            .await
            .map_err(|e| CanvasError::raster(format!("rasterization task failed: {e}")))?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
