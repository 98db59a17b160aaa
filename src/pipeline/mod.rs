// Request pipeline: request path -> source file -> resize -> watermark -> bytes

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::CacheHeaders;
use crate::config::{EngineSettings, Feature};
use crate::error::EngineError;
use crate::image_optimizer::{resize_within, RasterFormat, RasterImage};
use crate::sizing::{self, split_directive, RequestedSize};
use crate::watermark::{self, FontLibrary, ImageFetcher, WatermarkCatalog};

/// Output of a successful render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedImage {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub headers: CacheHeaders,
    pub output_size: (u32, u32),
    /// Source file the bytes were produced from
    pub source: PathBuf,
    /// Whether the bytes were produced by the engine rather than passed through
    pub transformed: bool,
}

/// Image engine bound to one set of settings and a loaded watermark catalog.
#[derive(Debug, Clone)]
pub struct ImageService {
    settings: Arc<EngineSettings>,
    catalog: Arc<WatermarkCatalog>,
}

impl ImageService {
    pub fn new(settings: Arc<EngineSettings>, catalog: Arc<WatermarkCatalog>) -> Self {
        Self { settings, catalog }
    }

    /// Load fonts and resolve every configured watermark, then build the service.
    pub async fn from_settings(settings: EngineSettings) -> Result<Self, EngineError> {
        let fonts = FontLibrary::load(settings.fonts())?;
        let fetcher = ImageFetcher::new(settings.fetcher_config())?;
        let catalog =
            WatermarkCatalog::load(settings.watermark_descriptors(), &fetcher, &fonts).await;

        tracing::info!(
            watermarks = catalog.len(),
            formats = settings.supported_extensions().len(),
            "Image service ready"
        );

        Ok(Self::new(Arc::new(settings), Arc::new(catalog)))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &WatermarkCatalog {
        &self.catalog
    }

    /// Render the image a request path names.
    ///
    /// `request_path` is relative to the configured root; a leading `/` is
    /// ignored. Returns `Ok(None)` when the service is switched off or the
    /// extension is not one the engine handles.
    pub fn render(&self, request_path: &str) -> Result<Option<RenderedImage>, EngineError> {
        if !self.settings.is_enabled(Feature::Service) {
            return Ok(None);
        }

        let relative = Path::new(request_path.trim_start_matches('/'));
        let Some(extension) = relative
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
        else {
            return Ok(None);
        };
        if !self.settings.is_supported(&extension) {
            tracing::debug!(request = %request_path, extension = %extension, "Extension not handled");
            return Ok(None);
        }

        let requested = self.settings.root().join(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(EngineError::NotFound(requested));
        }

        let source = locate_source(&requested, &extension)
            .ok_or_else(|| EngineError::NotFound(requested.clone()))?;
        let format = RasterFormat::from_extension(&extension)?;
        let original =
            std::fs::read(&source).map_err(|e| EngineError::io(source.clone(), e))?;

        let stem = requested
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        let requested_size = sizing::resolve(stem, self.settings.named_sizes());

        // `raster` holds transformed pixels only; `decoded` keeps an untouched
        // decode around so the watermark step need not decode twice
        let mut raster: Option<RasterImage> = None;
        let mut decoded: Option<RasterImage> = None;
        if let RequestedSize::Target(target) = requested_size {
            let source_raster = RasterImage::decode(&original)?.with_format(format);
            match resize_within(&source_raster, target, self.settings.output_limits()) {
                Ok(resized) => raster = Some(resized),
                Err(e) if e.is_invalid_size() => {
                    tracing::warn!(
                        request = %request_path,
                        error = %e,
                        "Invalid requested size, serving the original"
                    );
                    decoded = Some(source_raster);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let base = raster.as_ref().or(decoded.as_ref());
        if let Some(watermarked) = self.watermark(base, &original, format)? {
            raster = Some(watermarked);
        }

        let headers = CacheHeaders::for_file(
            &source,
            self.settings.cache_policy().ttl(&extension),
            &extension,
        )
        .map_err(|e| EngineError::io(source.clone(), e))?;

        let (bytes, output_size, transformed) = match raster {
            Some(raster) => (raster.encode()?, raster.dimensions(), true),
            None => {
                let size = RasterImage::probe_dimensions(&original)?;
                (original, size, false)
            }
        };

        tracing::info!(
            request = %request_path,
            source = %source.display(),
            width = output_size.0,
            height = output_size.1,
            transformed,
            "Rendered image variant"
        );

        Ok(Some(RenderedImage {
            bytes,
            content_type: headers.content_type.clone(),
            headers,
            output_size,
            source,
            transformed,
        }))
    }

    /// Draw the configured watermark when the feature is on and its key is
    /// in the catalog. Decodes `original` if nothing has been decoded yet.
    fn watermark(
        &self,
        base: Option<&RasterImage>,
        original: &[u8],
        format: RasterFormat,
    ) -> Result<Option<RasterImage>, EngineError> {
        if !self.settings.is_enabled(Feature::Watermark) {
            return Ok(None);
        }

        let placement = self.settings.watermark_placement();
        let Some(mark) = self.catalog.get(&placement.key) else {
            tracing::debug!(key = %placement.key, "No watermark configured for key");
            return Ok(None);
        };

        let decoded;
        let base = match base {
            Some(base) => base,
            None => {
                decoded = RasterImage::decode(original)?.with_format(format);
                &decoded
            }
        };

        let watermarked = watermark::apply(base, mark, placement.anchor, &placement.margin)?;
        Ok(Some(watermarked))
    }
}

/// The requested file if it exists, otherwise the file with the size
/// directive removed (`photo-l.jpg` -> `photo.jpg`).
fn locate_source(requested: &Path, extension: &str) -> Option<PathBuf> {
    if requested.is_file() {
        return Some(requested.to_path_buf());
    }

    let stem = requested.file_stem()?.to_str()?;
    let (base, _) = split_directive(stem)?;
    if base.is_empty() {
        return None;
    }

    let original_extension = requested
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or(extension);
    let candidate = requested.with_file_name(format!("{}.{}", base, original_extension));
    candidate.is_file().then_some(candidate)
}
