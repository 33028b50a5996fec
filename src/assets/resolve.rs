use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::sync::RwLock;

use crate::assets::data_uri;
use crate::assets::decode::{decode_image, sniff_mime};
use crate::assets::store::{ResolvedAsset, ResolvedAssets};
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::encode;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = concat!("qrcanvas/", env!("CARGO_PKG_VERSION"));

/// Where an asset comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    /// Already-embeddable `data:` URI.
    Inline(String),
    /// Local file, read fully.
    File(PathBuf),
    /// In-memory upload.
    Bytes(Arc<[u8]>),
    /// `http(s)` URL, fetched anonymously.
    Remote(String),
}

impl AssetSource {
    /// Classify a layer `src` string.
    pub fn classify(src: &str) -> Self {
        let s = src.trim();
        if data_uri::is_data_uri(s) {
            return Self::Inline(s.to_string());
        }
        let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Self::Remote(s.to_string());
        }
        Self::File(PathBuf::from(s.strip_prefix("file://").unwrap_or(s)))
    }

    fn describe(&self) -> String {
        match self {
            Self::Inline(_) => "inline data uri".to_string(),
            Self::File(p) => format!("file '{}'", p.display()),
            Self::Bytes(b) => format!("{} uploaded bytes", b.len()),
            Self::Remote(url) => format!("url '{url}'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Asset resolver options.
pub struct ResolverOpts {
    /// Per-asset bound; a slower asset counts as failed for its layer only.
    pub timeout: Duration,
    pub user_agent: String,
    /// Reuse successful remote fetches per exact URL.
    pub memoize: bool,
}

impl Default for ResolverOpts {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            memoize: true,
        }
    }
}

impl ResolverOpts {
    /// Defaults overridden by `QRCANVAS_FETCH_TIMEOUT_MS` and `QRCANVAS_USER_AGENT`.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(ms) = std::env::var("QRCANVAS_FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            opts.timeout = Duration::from_millis(ms);
        }
        if let Ok(ua) = std::env::var("QRCANVAS_USER_AGENT")
            && !ua.trim().is_empty()
        {
            opts.user_agent = ua;
        }
        opts
    }
}

/// One asset to resolve during a render cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRequest {
    pub layer_id: String,
    pub source: AssetSource,
}

impl AssetRequest {
    pub fn new(layer_id: impl Into<String>, src: &str) -> Self {
        Self {
            layer_id: layer_id.into(),
            source: AssetSource::classify(src),
        }
    }
}

/// Turns layer sources into embeddable, decoded assets.
///
/// Cheap to clone; clones share the HTTP client and the memo table. Requests carry no
/// cookies or credentials.
#[derive(Clone, Debug)]
pub struct AssetResolver {
    client: reqwest::Client,
    opts: ResolverOpts,
    memo: Arc<RwLock<HashMap<String, ResolvedAsset>>>,
}

impl AssetResolver {
    pub fn new(opts: ResolverOpts) -> CanvasResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(opts.user_agent.clone())
            .timeout(opts.timeout)
            .build()
            .map_err(|e| CanvasError::asset(format!("http client error: {e}")))?;
        Ok(Self {
            client,
            opts,
            memo: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn opts(&self) -> &ResolverOpts {
        &self.opts
    }

    /// Resolve one source. Errors are [`CanvasError::AssetResolution`].
    #[tracing::instrument(skip(self, source), fields(source = %source.describe()))]
    pub async fn resolve(&self, source: &AssetSource) -> CanvasResult<ResolvedAsset> {
        match source {
            AssetSource::Inline(uri) => {
                let parsed = data_uri::parse(uri)?;
                let image = decode_image(&parsed.bytes)?;
                Ok(ResolvedAsset {
                    data_uri: Arc::from(uri.as_str()),
                    image,
                })
            }
            AssetSource::File(path) => {
                let bytes = read_file(path).await?;
                embed_bytes(&bytes)
            }
            AssetSource::Bytes(bytes) => embed_bytes(bytes),
            AssetSource::Remote(url) => self.resolve_remote(url).await,
        }
    }

    async fn resolve_remote(&self, url: &str) -> CanvasResult<ResolvedAsset> {
        if self.opts.memoize
            && let Some(hit) = self.memo.read().await.get(url)
        {
            tracing::debug!(url, "asset memo hit");
            return Ok(hit.clone());
        }

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CanvasError::asset(format!("fetch '{url}': {e}")))?
            .error_for_status()
            .map_err(|e| CanvasError::asset(format!("fetch '{url}': {e}")))?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CanvasError::asset(format!("read body of '{url}': {e}")))?;

        let image = decode_image(&bytes)?;
        // Re-encode the decoded pixels so the embedded form never depends on the origin.
        let png = encode::encode_png(&image)?;
        let asset = ResolvedAsset {
            data_uri: Arc::from(data_uri::encode("image/png", &png)),
            image,
        };

        if self.opts.memoize {
            self.memo.write().await.insert(url.to_string(), asset.clone());
        }
        Ok(asset)
    }

    /// Resolve every request concurrently and wait for all of them to settle.
    ///
    /// Failures and timeouts become per-layer warnings; a failing request never affects its
    /// siblings.
    #[tracing::instrument(skip_all, fields(requests = requests.len()))]
    pub async fn resolve_all(&self, requests: Vec<AssetRequest>) -> ResolvedAssets {
        let timeout = self.opts.timeout;
        let handles: Vec<_> = requests
            .into_iter()
            .map(|req| {
                let resolver = self.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::timeout(timeout, resolver.resolve(&req.source)).await
                });
                (req.layer_id, handle)
            })
            .collect();

        let mut out = ResolvedAssets::new();
        for (layer_id, handle) in handles {
            let message = match handle.await {
                Ok(Ok(Ok(asset))) => {
                    out.insert(layer_id, asset);
                    continue;
                }
                Ok(Ok(Err(err))) => err.to_string(),
                Ok(Err(_)) => format!("asset resolution timed out after {timeout:?}"),
                Err(join) => format!("asset resolution task failed: {join}"),
            };
            tracing::warn!(layer_id = %layer_id, %message, "layer asset unavailable; layer omitted");
            out.warn(layer_id, message);
        }
        out
    }
}

async fn read_file(path: &Path) -> CanvasResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| CanvasError::asset(format!("read '{}': {e}", path.display())))
}

fn embed_bytes(bytes: &[u8]) -> CanvasResult<ResolvedAsset> {
    let image = decode_image(bytes)?;
    Ok(ResolvedAsset {
        data_uri: Arc::from(data_uri::encode(sniff_mime(bytes), bytes)),
        image,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
