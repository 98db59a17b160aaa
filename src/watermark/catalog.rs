//! Resolved watermark rasters, keyed by configuration name.
//!
//! Every descriptor is resolved exactly once when the catalog is loaded.
//! Resolution never fails: a source that cannot be fetched, decoded or
//! rendered is demoted to its raw descriptor string rendered as text.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use image::RgbaImage;

use super::compositor::rasterize;
use super::descriptor::{WatermarkDescriptor, WatermarkSource};
use super::image_fetcher::ImageFetcher;
use super::text_renderer::FontLibrary;
use super::WatermarkError;

/// Immutable map from watermark key to its raster.
#[derive(Clone, Default)]
pub struct WatermarkCatalog {
    entries: HashMap<String, Arc<RgbaImage>>,
}

impl std::fmt::Debug for WatermarkCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("WatermarkCatalog")
            .field("keys", &keys)
            .finish()
    }
}

impl WatermarkCatalog {
    /// Resolve every descriptor in `descriptors`.
    ///
    /// A key whose literal fallback also fails to render (for example an
    /// empty descriptor) is left out of the catalog with a warning.
    pub async fn load(
        descriptors: &BTreeMap<String, String>,
        fetcher: &ImageFetcher,
        fonts: &FontLibrary,
    ) -> Self {
        let mut entries = HashMap::with_capacity(descriptors.len());

        for (key, raw) in descriptors {
            let source = WatermarkSource::parse(raw);
            tracing::debug!(key = %key, kind = source.kind(), "Resolving watermark");

            let descriptor = resolve_source(source, raw, fetcher).await;
            match rasterize_with_fallback(&descriptor, raw, fonts) {
                Ok(raster) => {
                    tracing::info!(
                        key = %key,
                        width = raster.width(),
                        height = raster.height(),
                        "Watermark ready"
                    );
                    entries.insert(key.clone(), Arc::new(raster));
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Watermark could not be rendered, skipping");
                }
            }
        }

        Self { entries }
    }

    /// Build a catalog from already rasterized watermarks.
    pub fn from_rasters(rasters: impl IntoIterator<Item = (String, RgbaImage)>) -> Self {
        Self {
            entries: rasters
                .into_iter()
                .map(|(key, raster)| (key, Arc::new(raster)))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<RgbaImage>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Turn a classified source into a descriptor, demoting fetch failures to the
/// raw string.
pub async fn resolve_source(
    source: WatermarkSource,
    raw: &str,
    fetcher: &ImageFetcher,
) -> WatermarkDescriptor {
    let fetched = match source {
        WatermarkSource::Remote(url) => fetcher.fetch_remote(&url).await,
        WatermarkSource::File(path) => fetcher.fetch_file(&path).await,
        WatermarkSource::Font(spec) => return WatermarkDescriptor::Text(spec),
        WatermarkSource::Literal(text) => return WatermarkDescriptor::literal(text),
    };

    match fetched {
        Ok(bytes) => WatermarkDescriptor::Image {
            bytes,
            origin: raw.to_string(),
        },
        Err(e) => {
            tracing::warn!(source = %raw, error = %e, "Watermark fetch failed, rendering descriptor as text");
            WatermarkDescriptor::literal(raw)
        }
    }
}

/// Rasterize, and if that fails render `raw` as literal text instead.
fn rasterize_with_fallback(
    descriptor: &WatermarkDescriptor,
    raw: &str,
    fonts: &FontLibrary,
) -> Result<RgbaImage, WatermarkError> {
    match rasterize(descriptor, fonts) {
        Ok(raster) => Ok(raster),
        Err(e) if !matches!(descriptor, WatermarkDescriptor::Text(spec) if spec.content == raw) => {
            tracing::warn!(source = %raw, error = %e, "Watermark render failed, rendering descriptor as text");
            rasterize(&WatermarkDescriptor::literal(raw), fonts)
        }
        Err(e) => Err(e),
    }
}
